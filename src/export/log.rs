//! Append-only CSV audit trail of completed full exports.
//!
//! The log is consulted before a new export to warn about products whose
//! date range was already exported; it never blocks an export.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ExplorerError, ReviewDocument, is_unconstrained};
use crate::files::{self, WriteMode};
use crate::filters::FilterSet;

use super::model::ExportSettings;

/// Default log location, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "review_exports_log.csv";

/// Label recorded when a field carries no constraint.
const ALL_LABEL: &str = "ALL";

/// One exported product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLogEntry {
    /// Product name, or `ALL` when no product was selected.
    pub product: String,
    /// Comma-joined brands, or `ALL`.
    pub brand: String,
    /// Inclusive start of the exported range.
    pub start_date: Option<NaiveDate>,
    /// Inclusive end of the exported range.
    pub end_date: Option<NaiveDate>,
    /// Comma-joined countries, or `ALL`.
    pub country: String,
    /// Rows per page used for the export.
    pub rows: u32,
    /// Sampling seed, if one was used.
    pub random_seed: Option<u64>,
    /// Documents exported for this product.
    pub nb_reviews: u64,
    /// When the export completed.
    pub export_timestamp: DateTime<Utc>,
}

impl ExportLogEntry {
    /// Returns true when both entries cover at least one common day.
    ///
    /// Missing bounds are open-ended.
    #[must_use]
    pub fn overlaps(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        let starts_before_other_ends = match (self.start_date, end) {
            (Some(own_start), Some(other_end)) => own_start <= other_end,
            _ => true,
        };
        let other_starts_before_end = match (start, self.end_date) {
            (Some(other_start), Some(own_end)) => other_start <= own_end,
            _ => true,
        };
        starts_before_other_ends && other_starts_before_end
    }
}

/// Builds the entries recorded for a completed export.
///
/// A single selected product is credited with every document. With several
/// products, each is credited with the documents whose `product` field
/// matches its name. With none, one `ALL` entry carries the total.
#[must_use]
pub fn entries_for_export(
    filters: &FilterSet,
    settings: &ExportSettings,
    docs: &[ReviewDocument],
    completed_at: DateTime<Utc>,
) -> Vec<ExportLogEntry> {
    let products = constrained(&filters.product);
    let entry = |product: &str, nb_reviews: u64| ExportLogEntry {
        product: product.to_owned(),
        brand: joined_or_all(&filters.brand),
        start_date: filters.start_date,
        end_date: filters.end_date,
        country: joined_or_all(&filters.country),
        rows: settings.rows(),
        random_seed: settings.random_seed(),
        nb_reviews,
        export_timestamp: completed_at,
    };

    match products.as_slice() {
        [] => vec![entry(ALL_LABEL, count(docs.len()))],
        [single] => vec![entry(single, count(docs.len()))],
        several => several
            .iter()
            .map(|product| {
                let matching = docs
                    .iter()
                    .filter(|doc| doc.get("product").and_then(|v| v.as_str()) == Some(*product))
                    .count();
                entry(product, count(matching))
            })
            .collect(),
    }
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn constrained(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(String::as_str)
        .filter(|value| !is_unconstrained(value))
        .collect()
}

fn joined_or_all(values: &[String]) -> String {
    let kept = constrained(values);
    if kept.is_empty() {
        ALL_LABEL.to_owned()
    } else {
        kept.join(",")
    }
}

/// Handle on the export log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLog {
    path: Utf8PathBuf,
}

impl ExportLog {
    /// Uses the log at `path`; the file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Reads every entry; a missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Io`] when the file cannot be read or a row
    /// is malformed.
    pub fn read_entries(&self) -> Result<Vec<ExportLogEntry>, ExplorerError> {
        let Some(contents) = files::read_optional(&self.path, "export log")? else {
            return Ok(Vec::new());
        };
        let mut reader = csv::ReaderBuilder::new().from_reader(contents.as_bytes());
        reader
            .deserialize()
            .map(|row| {
                row.map_err(|error| ExplorerError::Io {
                    message: format!("malformed export log '{}': {error}", self.path),
                })
            })
            .collect()
    }

    /// Appends entries, writing the header only when the file is new.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Io`] when the file cannot be written.
    pub fn append(&self, entries: &[ExportLogEntry]) -> Result<usize, ExplorerError> {
        if entries.is_empty() {
            return Ok(0);
        }
        let has_content = files::read_optional(&self.path, "export log")?
            .is_some_and(|contents| !contents.trim().is_empty());
        let file = files::open_for_write(&self.path, "export log", WriteMode::Append)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(!has_content)
            .from_writer(file);
        for entry in entries {
            writer.serialize(entry).map_err(|error| ExplorerError::Io {
                message: format!("failed to write export log '{}': {error}", self.path),
            })?;
        }
        writer
            .flush()
            .map_err(|error| ExplorerError::io("failed to flush export log", &error))?;
        tracing::info!(entries = entries.len(), path = %self.path, "appended export log");
        Ok(entries.len())
    }

    /// Prior entries for the selected products whose range intersects the
    /// filter's date range.
    ///
    /// # Errors
    ///
    /// Propagates [`ExportLog::read_entries`] failures.
    pub fn overlapping(&self, filters: &FilterSet) -> Result<Vec<ExportLogEntry>, ExplorerError> {
        let selected = constrained(&filters.product);
        Ok(self
            .read_entries()?
            .into_iter()
            .filter(|entry| {
                let same_product = if selected.is_empty() {
                    entry.product == ALL_LABEL
                } else {
                    selected.contains(&entry.product.as_str())
                };
                same_product && entry.overlaps(filters.start_date, filters.end_date)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::export::model::ExportMode;

    fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 2, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn settings() -> ExportSettings {
        ExportSettings::new(500, ExportMode::Full)
            .expect("valid settings")
            .with_seed(Some(11))
    }

    #[fixture]
    fn filters() -> FilterSet {
        FilterSet {
            start_date: date(2025, 1, 1),
            end_date: date(2025, 3, 31),
            brand: vec!["AVENE".to_owned()],
            product: vec!["Cicalfate".to_owned()],
            ..FilterSet::default()
        }
    }

    fn log_in(dir: &TempDir) -> ExportLog {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("logs").join(DEFAULT_LOG_FILE))
            .expect("temp path should be UTF-8");
        ExportLog::new(path)
    }

    #[rstest]
    fn append_then_read_round_trips(filters: FilterSet, settings: ExportSettings) {
        let dir = TempDir::new().expect("temp dir");
        let log = log_in(&dir);
        let docs = vec![serde_json::Map::new(), serde_json::Map::new()];
        let entries = entries_for_export(&filters, &settings, &docs, timestamp());

        assert_eq!(log.append(&entries).expect("first append"), 1);
        assert_eq!(log.append(&entries).expect("second append"), 1);

        let read = log.read_entries().expect("read back");
        assert_eq!(read.len(), 2);
        let first = read.first().expect("an entry");
        assert_eq!(first, entries.first().expect("an entry"));
        assert_eq!(first.nb_reviews, 2);
        assert_eq!(first.random_seed, Some(11));

        let raw = std::fs::read_to_string(log.path()).expect("raw log");
        assert_eq!(raw.matches("product,brand").count(), 1, "single header");
    }

    #[rstest]
    fn missing_log_reads_empty() {
        let dir = TempDir::new().expect("temp dir");
        assert!(log_in(&dir).read_entries().expect("read").is_empty());
    }

    #[rstest]
    fn several_products_are_counted_from_documents(settings: ExportSettings) {
        let filters = FilterSet {
            product: vec!["Cicalfate".to_owned(), "Cleanance".to_owned()],
            ..FilterSet::default()
        };
        let docs: Vec<ReviewDocument> = [
            json!({"product": "Cicalfate"}),
            json!({"product": "Cleanance"}),
            json!({"product": "Cicalfate"}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect();

        let entries = entries_for_export(&filters, &settings, &docs, timestamp());
        let counts: Vec<(&str, u64)> = entries
            .iter()
            .map(|entry| (entry.product.as_str(), entry.nb_reviews))
            .collect();
        assert_eq!(counts, vec![("Cicalfate", 2), ("Cleanance", 1)]);
        assert!(entries.iter().all(|entry| entry.brand == "ALL"));
    }

    #[rstest]
    fn no_product_selection_logs_all(settings: ExportSettings) {
        let entries = entries_for_export(
            &FilterSet::default(),
            &settings,
            &[serde_json::Map::new()],
            timestamp(),
        );
        assert_eq!(entries.len(), 1);
        let entry = entries.first().expect("an entry");
        assert_eq!(entry.product, "ALL");
        assert_eq!(entry.country, "ALL");
        assert_eq!(entry.nb_reviews, 1);
    }

    #[rstest]
    #[case(date(2025, 3, 1), date(2025, 6, 30), true)]
    #[case(date(2024, 1, 1), date(2024, 12, 31), false)]
    #[case(date(2025, 4, 1), None, false)]
    #[case(None, date(2025, 1, 1), true)]
    #[case(None, None, true)]
    fn overlap_uses_inclusive_open_ended_ranges(
        filters: FilterSet,
        settings: ExportSettings,
        #[case] start: Option<NaiveDate>,
        #[case] end: Option<NaiveDate>,
        #[case] expected: bool,
    ) {
        let entries = entries_for_export(&filters, &settings, &[], timestamp());
        let entry = entries.first().expect("an entry");
        assert_eq!(entry.overlaps(start, end), expected);
    }

    #[rstest]
    fn overlapping_filters_by_product_and_range(filters: FilterSet, settings: ExportSettings) {
        let dir = TempDir::new().expect("temp dir");
        let log = log_in(&dir);
        let other_product = FilterSet {
            product: vec!["Cleanance".to_owned()],
            ..filters.clone()
        };
        let mut entries = entries_for_export(&filters, &settings, &[], timestamp());
        entries.extend(entries_for_export(&other_product, &settings, &[], timestamp()));
        log.append(&entries).expect("append");

        let later = FilterSet {
            start_date: date(2025, 3, 15),
            end_date: date(2025, 5, 1),
            ..filters.clone()
        };
        let hits = log.overlapping(&later).expect("overlap check");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().map(|e| e.product.as_str()), Some("Cicalfate"));

        let disjoint = FilterSet {
            start_date: date(2025, 4, 1),
            end_date: None,
            ..filters
        };
        assert!(log.overlapping(&disjoint).expect("overlap check").is_empty());
    }

    #[rstest]
    fn malformed_log_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let log = log_in(&dir);
        std::fs::create_dir_all(dir.path().join("logs")).expect("mkdir");
        std::fs::write(log.path(), "product,brand\nonly-one-column\n").expect("seed");
        assert!(matches!(
            log.read_entries(),
            Err(ExplorerError::Io { .. })
        ));
    }
}
