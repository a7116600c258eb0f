//! Typed review filters and their projection onto API query parameters.
//!
//! A [`FilterSet`] captures every sidebar constraint of the explorer. Blank
//! values and the `ALL` sentinel mean "no constraint" and never reach the
//! wire: [`FilterSet::to_query`] omits those keys entirely.

mod loader;

pub use loader::EXAMPLE_FILTER_JSON;

use chrono::NaiveDate;

use crate::api::{QueryParams, is_unconstrained};

/// Date format used on the wire and in filter JSON.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query keys understood by the filterable endpoints.
pub mod keys {
    /// Inclusive lower date bound.
    pub const START_DATE: &str = "start-date";
    /// Inclusive upper date bound.
    pub const END_DATE: &str = "end-date";
    /// Category name.
    pub const CATEGORY: &str = "category";
    /// Subcategory name.
    pub const SUBCATEGORY: &str = "subcategory";
    /// Comma-joined brands.
    pub const BRAND: &str = "brand";
    /// Comma-joined product names.
    pub const PRODUCT: &str = "product";
    /// Comma-joined countries.
    pub const COUNTRY: &str = "country";
    /// Comma-joined sources.
    pub const SOURCE: &str = "source";
    /// Comma-joined markets.
    pub const MARKET: &str = "market";
    /// Comma-joined attributes.
    pub const ATTRIBUTE: &str = "attribute";
    /// Comma-joined attributes mentioned positively.
    pub const ATTRIBUTE_POSITIVE: &str = "attribute-positive";
    /// Comma-joined attributes mentioned negatively.
    pub const ATTRIBUTE_NEGATIVE: &str = "attribute-negative";
}

/// Review filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Inclusive start date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive end date.
    pub end_date: Option<NaiveDate>,
    /// Category, `None` or `ALL` for every category.
    pub category: Option<String>,
    /// Subcategory, `None` or `ALL` for every subcategory.
    pub subcategory: Option<String>,
    /// Selected brands.
    pub brand: Vec<String>,
    /// Selected products.
    pub product: Vec<String>,
    /// Selected countries.
    pub country: Vec<String>,
    /// Selected review sources.
    pub source: Vec<String>,
    /// Selected markets.
    pub market: Vec<String>,
    /// Attributes that must be mentioned.
    pub attribute: Vec<String>,
    /// Attributes that must be mentioned positively.
    pub attribute_positive: Vec<String>,
    /// Attributes that must be mentioned negatively.
    pub attribute_negative: Vec<String>,
}

impl FilterSet {
    /// Projects the filters onto query parameters.
    ///
    /// Unconstrained fields are omitted.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(start) = self.start_date {
            params.set(keys::START_DATE, start.format(DATE_FORMAT).to_string());
        }
        if let Some(end) = self.end_date {
            params.set(keys::END_DATE, end.format(DATE_FORMAT).to_string());
        }
        if let Some(category) = self.category.as_deref() {
            params.set_constraint(keys::CATEGORY, category);
        }
        if let Some(subcategory) = self.subcategory.as_deref() {
            params.set_constraint(keys::SUBCATEGORY, subcategory);
        }
        params.set_list(keys::BRAND, &self.brand);
        params.set_list(keys::PRODUCT, &self.product);
        params.set_list(keys::COUNTRY, &self.country);
        params.set_list(keys::SOURCE, &self.source);
        params.set_list(keys::MARKET, &self.market);
        params.set_list(keys::ATTRIBUTE, &self.attribute);
        params.set_list(keys::ATTRIBUTE_POSITIVE, &self.attribute_positive);
        params.set_list(keys::ATTRIBUTE_NEGATIVE, &self.attribute_negative);
        params
    }

    /// Parameters used to scope reference lookups (`/brands`, `/attributes`).
    ///
    /// Only category, subcategory, and (optionally) brands participate.
    #[must_use]
    pub fn scope_query(&self, include_brands: bool) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(category) = self.category.as_deref() {
            params.set_constraint(keys::CATEGORY, category);
        }
        if let Some(subcategory) = self.subcategory.as_deref() {
            params.set_constraint(keys::SUBCATEGORY, subcategory);
        }
        if include_brands {
            params.set_list(keys::BRAND, &self.brand);
        }
        params
    }

    /// Returns the category when it constrains the query.
    #[must_use]
    pub fn effective_category(&self) -> Option<&str> {
        effective(self.category.as_deref())
    }

    /// Returns the subcategory when it constrains the query.
    #[must_use]
    pub fn effective_subcategory(&self) -> Option<&str> {
        effective(self.subcategory.as_deref())
    }

    /// Returns true when no field constrains the query.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.to_query().is_empty()
    }

    /// One-line human summary of the active filters.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(start) = self.start_date {
            parts.push(format!("from {start}"));
        }
        if let Some(end) = self.end_date {
            parts.push(format!("to {end}"));
        }
        if let Some(category) = self.effective_category() {
            parts.push(format!("category: {category}"));
        }
        if let Some(subcategory) = self.effective_subcategory() {
            parts.push(format!("subcategory: {subcategory}"));
        }
        push_list(&mut parts, "brands", &self.brand);
        push_list(&mut parts, "products", &self.product);
        push_list(&mut parts, "countries", &self.country);
        push_list(&mut parts, "sources", &self.source);
        push_list(&mut parts, "markets", &self.market);
        push_list(&mut parts, "attributes", &self.attribute);
        if parts.is_empty() {
            return "no filters".to_owned();
        }
        parts.join(" | ")
    }
}

fn effective(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !is_unconstrained(text))
}

fn push_list(parts: &mut Vec<String>, label: &str, values: &[String]) {
    let kept: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|value| !is_unconstrained(value))
        .collect();
    if !kept.is_empty() {
        parts.push(format!("{label}: {}", kept.join(", ")));
    }
}
