//! Deterministic names for exported files.

use chrono::Datelike;

use crate::api::is_unconstrained;
use crate::filters::FilterSet;

const MAX_FILE_NAME: usize = 100;
const TRUNCATED_BASE: usize = 96;
const MAX_PRODUCT_SLUG: usize = 15;

/// What an exported file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Every document of a full export.
    Complete,
    /// The single preview page.
    Preview,
    /// One browsed results page (1-based).
    Page(u32),
}

/// Builds `reviews[_country][_p1-p2[-plus]][_dates][_apercu|_pageN].ext`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use review_explorer::export::{FileKind, export_file_name};
/// use review_explorer::filters::FilterSet;
///
/// let filters = FilterSet {
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
///     end_date: NaiveDate::from_ymd_opt(2025, 3, 31),
///     country: vec!["France".to_owned()],
///     ..FilterSet::default()
/// };
/// assert_eq!(
///     export_file_name(&filters, FileKind::Preview, "csv"),
///     "reviews_france_2025_0101-0331_apercu.csv"
/// );
/// ```
#[must_use]
pub fn export_file_name(filters: &FilterSet, kind: FileKind, extension: &str) -> String {
    let mut parts = vec!["reviews".to_owned()];

    let countries: Vec<&str> = constrained(&filters.country).collect();
    if !countries.is_empty() {
        parts.push(countries.join(",").to_lowercase());
    }

    let products: Vec<&str> = constrained(&filters.product).collect();
    if !products.is_empty() {
        let mut slug = products
            .iter()
            .take(2)
            .map(|product| product_slug(product))
            .collect::<Vec<_>>()
            .join("-");
        if products.len() > 2 {
            slug.push_str("-plus");
        }
        parts.push(slug);
    }

    if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
        let range = if start.year() == end.year() {
            format!("{}_{}-{}", start.format("%Y"), start.format("%m%d"), end.format("%m%d"))
        } else {
            format!("{}-{}", start.format("%Y%m%d"), end.format("%Y%m%d"))
        };
        parts.push(range);
    }

    match kind {
        FileKind::Complete => {}
        FileKind::Preview => parts.push("apercu".to_owned()),
        FileKind::Page(page) => parts.push(format!("page{page}")),
    }

    let name = format!("{}.{extension}", parts.join("_"));
    if name.chars().count() <= MAX_FILE_NAME {
        return name;
    }
    let base: String = parts.join("_").chars().take(TRUNCATED_BASE).collect();
    format!("{base}....{extension}")
}

fn constrained(values: &[String]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !is_unconstrained(value))
}

fn product_slug(product: &str) -> String {
    product
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('/', "-")
        .chars()
        .take(MAX_PRODUCT_SLUG)
        .collect()
}
