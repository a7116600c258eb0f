//! Endpoints and response payloads of the Ratings & Reviews API.
//!
//! Every endpoint wraps its payload in a `{ "result": { ... } }` envelope. The
//! gateway strips the envelope and hands back the inner value; the types here
//! decode that value for each endpoint.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ExplorerError;

/// A single review as returned by `/reviews`.
///
/// Review documents have no fixed schema; fields vary per source.
pub type ReviewDocument = Map<String, Value>;

/// API endpoints used by the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Account quota usage.
    Quotas,
    /// Categories and their subcategories.
    Categories,
    /// Brand names.
    Brands,
    /// Country names.
    Countries,
    /// Review sources.
    Sources,
    /// Markets.
    Markets,
    /// Products for a brand.
    Products,
    /// Product attributes.
    Attributes,
    /// Aggregated counts for a filter.
    Metrics,
    /// Review documents, paginated by cursor.
    Reviews,
}

impl Endpoint {
    /// Path appended to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Quotas => "/quotas",
            Self::Categories => "/categories",
            Self::Brands => "/brands",
            Self::Countries => "/countries",
            Self::Sources => "/sources",
            Self::Markets => "/markets",
            Self::Products => "/products",
            Self::Attributes => "/attributes",
            Self::Metrics => "/metrics",
            Self::Reviews => "/reviews",
        }
    }

    /// Key of the name list inside the result for list-shaped endpoints.
    #[must_use]
    pub const fn list_key(self) -> Option<&'static str> {
        match self {
            Self::Brands => Some("brands"),
            Self::Countries => Some("countries"),
            Self::Sources => Some("sources"),
            Self::Markets => Some("markets"),
            Self::Attributes => Some("attributes"),
            Self::Products => Some("products"),
            Self::Quotas | Self::Categories | Self::Metrics | Self::Reviews => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub(crate) result: Value,
}

/// Decodes an endpoint result into `T`.
///
/// # Errors
///
/// Returns [`ExplorerError::Decode`] when the value does not match `T`.
pub fn decode<T: DeserializeOwned>(endpoint: Endpoint, value: Value) -> Result<T, ExplorerError> {
    serde_json::from_value(value).map_err(|error| ExplorerError::Decode {
        endpoint: endpoint.path().to_owned(),
        message: error.to_string(),
    })
}

/// Quota usage returned by `/quotas`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Quotas {
    /// Volume consumed so far.
    #[serde(rename = "used volume", default)]
    pub used_volume: Value,
    /// Volume still available.
    #[serde(rename = "remaining volume", default)]
    pub remaining_volume: Value,
    /// Total quota.
    #[serde(default)]
    pub quota: Value,
    /// Date the quota expires.
    #[serde(rename = "end date", default)]
    pub end_date: Value,
}

/// A category and its subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Category name.
    pub category: String,
    /// Subcategory names.
    #[serde(default)]
    pub subcategories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryList {
    #[serde(default)]
    pub(crate) categories: Vec<Category>,
}

/// Product entry: either a bare name or an object carrying one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductEntry {
    Name(String),
    Object {
        #[serde(alias = "product")]
        name: String,
    },
}

impl ProductEntry {
    pub(crate) fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Object { name } => name,
        }
    }
}

/// Aggregated counts returned by `/metrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MetricsSummary {
    /// Number of reviews matching the filter.
    #[serde(rename = "nbDocs", alias = "numFound", alias = "total", default)]
    pub nb_docs: u64,
}

/// One page of `/reviews`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReviewPage {
    /// Documents on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub docs: Vec<ReviewDocument>,
    /// Total number of matching documents.
    #[serde(rename = "numFound", default, deserialize_with = "null_as_default")]
    pub num_found: u64,
    /// Cursor for the following page.
    #[serde(rename = "nextCursorMark", default)]
    pub next_cursor_mark: Option<String>,
}

impl ReviewPage {
    /// Decodes a `/reviews` result, reading a `null` result as an empty page.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Decode`] when the result is not a page.
    pub fn from_result(value: Value) -> Result<Self, ExplorerError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        decode(Endpoint::Reviews, value)
    }
}

/// Reads an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Renders a loosely typed scalar for display.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "N/A".to_owned(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
