//! Flattening of review documents into a fixed-column table.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde_json::Value;

use crate::api::ReviewDocument;

use super::attributes::{AttributeMentions, PREDEFINED_ATTRIBUTES};

const RENAMES: [(&str, &str); 4] = [
    ("id", "guid"),
    ("category", "categories"),
    ("content trad", "verbatim_content"),
    ("product", "product_name_SEMANTIWEB"),
];

const ATTRIBUTES_ALL: &str = "attributes";
const ATTRIBUTES_POSITIVE: &str = "attributes positive";
const ATTRIBUTES_NEGATIVE: &str = "attributes negative";
const DROPPED: [&str; 4] = [
    ATTRIBUTES_ALL,
    ATTRIBUTES_POSITIVE,
    ATTRIBUTES_NEGATIVE,
    "content origin",
];

const DATE_COLUMN: &str = "date";
const BUSINESS_INDICATOR: &str = "business indicator";
const SAMPLING_COLUMN: &str = "Sampling";
const SAMPLING_MARKER: &str = "Sampling Rate";
const SAFETY_COLUMN: &str = "safety";

/// A rectangular table of string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTable {
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows, each as long as `columns`.
    pub rows: Vec<Vec<String>>,
}

impl FlatTable {
    /// Cell at `row` under `column`, if both exist.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flattens documents for spreadsheet export.
///
/// Columns are the documents' own fields in first-seen order (renamed, with
/// attribute lists and `content origin` removed), then `Sampling` when any
/// document carries a business indicator, then one `attribute_<Name>` column
/// per predefined attribute, then `safety`.
#[must_use]
pub fn flatten(docs: &[ReviewDocument]) -> FlatTable {
    if docs.is_empty() {
        return FlatTable::default();
    }

    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut cells: Vec<HashMap<String, String>> = Vec::with_capacity(docs.len());
    let mut with_sampling = false;

    for doc in docs {
        let mut row = HashMap::new();
        for (key, value) in doc {
            if DROPPED.contains(&key.as_str()) {
                continue;
            }
            let column = renamed(key);
            let cell = if key == DATE_COLUMN {
                month_date(value)
            } else {
                cell_text(value)
            };
            if seen.insert(column.to_owned()) {
                columns.push(column.to_owned());
            }
            row.insert(column.to_owned(), cell);
        }

        with_sampling |= doc.contains_key(BUSINESS_INDICATOR);
        let sampled = doc
            .get(BUSINESS_INDICATOR)
            .is_some_and(|value| cell_text(value).contains(SAMPLING_MARKER));
        row.insert(
            SAMPLING_COLUMN.to_owned(),
            if sampled { "1" } else { "0" }.to_owned(),
        );

        let mentions = AttributeMentions::from_values(
            doc.get(ATTRIBUTES_ALL),
            doc.get(ATTRIBUTES_POSITIVE),
            doc.get(ATTRIBUTES_NEGATIVE),
        );
        for attribute in PREDEFINED_ATTRIBUTES {
            row.insert(
                attribute_column(attribute),
                mentions.sentiment(attribute).label().to_owned(),
            );
        }
        row.insert(SAFETY_COLUMN.to_owned(), mentions.safety().label().to_owned());
        cells.push(row);
    }

    if with_sampling && seen.insert(SAMPLING_COLUMN.to_owned()) {
        columns.push(SAMPLING_COLUMN.to_owned());
    }
    for attribute in PREDEFINED_ATTRIBUTES {
        let column = attribute_column(attribute);
        if seen.insert(column.clone()) {
            columns.push(column);
        }
    }
    if seen.insert(SAFETY_COLUMN.to_owned()) {
        columns.push(SAFETY_COLUMN.to_owned());
    }

    let rows = cells
        .into_iter()
        .map(|mut row| {
            columns
                .iter()
                .map(|column| row.remove(column).unwrap_or_default())
                .collect()
        })
        .collect();

    FlatTable { columns, rows }
}

fn renamed(key: &str) -> &str {
    RENAMES
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| *to)
}

fn attribute_column(attribute: &str) -> String {
    format!("attribute_{attribute}")
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Normalises a date to the first of its month as `01/MM/YYYY`.
fn month_date(value: &Value) -> String {
    let Some(text) = value.as_str() else {
        return String::new();
    };
    text.trim()
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("01/%m/%Y").to_string())
        .unwrap_or_default()
}
