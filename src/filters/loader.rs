//! Loading and saving filter sets as pasted JSON configuration.
//!
//! The payload mirrors the query keys: dates as `YYYY-MM-DD` strings and
//! comma-joined strings for list fields. Arrays are accepted for list fields
//! as well, and the legacy `datetime.date(Y, M, D)` date notation is still
//! understood. Unknown keys such as `token` are ignored.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::ExplorerError;

use super::{DATE_FORMAT, FilterSet, keys};

/// Example payload shown when a pasted configuration fails to parse.
pub const EXAMPLE_FILTER_JSON: &str = r#"{
  "start-date": "2025-01-01",
  "end-date": "2025-04-30",
  "brand": "AVÈNE,aderma,arthrodont,BIODERMA",
  "category": "bodycare",
  "subcategory": "body creams & milks",
  "country": "France"
}"#;

const LEGACY_DATE_PREFIX: &str = "datetime.date(";

#[derive(Debug, Serialize)]
struct FilterPayload {
    #[serde(rename = "start-date", skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(rename = "end-date", skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(rename = "attribute-positive", skip_serializing_if = "Option::is_none")]
    attribute_positive: Option<String>,
    #[serde(rename = "attribute-negative", skip_serializing_if = "Option::is_none")]
    attribute_negative: Option<String>,
}

impl FilterSet {
    /// Parses a pasted JSON filter configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidFilterJson`] with line and column for
    /// syntax errors, [`ExplorerError::InvalidFilters`] when the payload is
    /// not an object or a field has the wrong type, and
    /// [`ExplorerError::InvalidDate`] for unparseable dates.
    pub fn from_json(input: &str) -> Result<Self, ExplorerError> {
        let cleaned = input.trim();
        if !cleaned.starts_with('{') {
            return Err(ExplorerError::InvalidFilters {
                message: "the JSON must start with '{'".to_owned(),
            });
        }

        let parsed: Value =
            serde_json::from_str(cleaned).map_err(|error| ExplorerError::InvalidFilterJson {
                line: error.line(),
                column: error.column(),
                message: error.to_string(),
                example: EXAMPLE_FILTER_JSON.to_owned(),
            })?;

        let Value::Object(object) = parsed else {
            return Err(ExplorerError::InvalidFilters {
                message: "the JSON must be an object".to_owned(),
            });
        };

        Ok(Self {
            start_date: date_field(&object, keys::START_DATE)?,
            end_date: date_field(&object, keys::END_DATE)?,
            category: text_field(&object, keys::CATEGORY)?,
            subcategory: text_field(&object, keys::SUBCATEGORY)?,
            brand: list_field(&object, keys::BRAND)?,
            product: list_field(&object, keys::PRODUCT)?,
            country: list_field(&object, keys::COUNTRY)?,
            source: list_field(&object, keys::SOURCE)?,
            market: list_field(&object, keys::MARKET)?,
            attribute: list_field(&object, keys::ATTRIBUTE)?,
            attribute_positive: list_field(&object, keys::ATTRIBUTE_POSITIVE)?,
            attribute_negative: list_field(&object, keys::ATTRIBUTE_NEGATIVE)?,
        })
    }

    /// Serializes the filter set as a pretty JSON configuration that
    /// [`FilterSet::from_json`] reloads to an equal value.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Io`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ExplorerError> {
        let payload = FilterPayload {
            start_date: self
                .start_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            end_date: self.end_date.map(|date| date.format(DATE_FORMAT).to_string()),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            brand: joined(&self.brand),
            product: joined(&self.product),
            country: joined(&self.country),
            source: joined(&self.source),
            market: joined(&self.market),
            attribute: joined(&self.attribute),
            attribute_positive: joined(&self.attribute_positive),
            attribute_negative: joined(&self.attribute_negative),
        };
        serde_json::to_string_pretty(&payload).map_err(|error| ExplorerError::Io {
            message: format!("JSON serialization failed: {error}"),
        })
    }
}

fn joined(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(","))
}

/// Looks a key up under its dashed name, falling back to the underscored one.
fn lookup<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .get(key)
        .or_else(|| object.get(key.replace('-', "_").as_str()))
        .filter(|value| !value.is_null())
}

fn text_field(object: &Map<String, Value>, key: &str) -> Result<Option<String>, ExplorerError> {
    match lookup(object, key) {
        None => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
        }
        Some(other) => Err(ExplorerError::InvalidFilters {
            message: format!("'{key}' must be a string, got {other}"),
        }),
    }
}

fn list_field(object: &Map<String, Value>, key: &str) -> Result<Vec<String>, ExplorerError> {
    match lookup(object, key) {
        None => Ok(Vec::new()),
        Some(Value::String(text)) => Ok(split_list(text)),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.trim().to_owned(),
                other => other.to_string(),
            })
            .filter(|item| !item.is_empty())
            .collect()),
        Some(other) => Err(ExplorerError::InvalidFilters {
            message: format!("'{key}' must be a string or a list, got {other}"),
        }),
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn date_field(object: &Map<String, Value>, key: &str) -> Result<Option<NaiveDate>, ExplorerError> {
    match lookup(object, key) {
        None => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => parse_date(text)
            .map(Some)
            .ok_or_else(|| ExplorerError::InvalidDate {
                field: key.to_owned(),
                value: text.clone(),
            }),
        Some(other) => Err(ExplorerError::InvalidDate {
            field: key.to_owned(),
            value: other.to_string(),
        }),
    }
}

/// Parses `YYYY-MM-DD`, an ISO timestamp starting with it, or the legacy
/// `datetime.date(Y, M, D)` form.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if let Some(arguments) = trimmed
        .strip_prefix(LEGACY_DATE_PREFIX)
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_legacy_date(arguments);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    trimmed
        .get(..10)
        .filter(|_| matches!(trimmed.chars().nth(10), Some('T' | ' ')))
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}

fn parse_legacy_date(arguments: &str) -> Option<NaiveDate> {
    let mut parts = arguments.split(',').map(str::trim);
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
