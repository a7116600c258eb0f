//! Reference data lookups with a time-bounded response cache.
//!
//! Lookups are keyed by `(endpoint, query parameters)`; a repeated lookup
//! with the same parameter tuple is served from memory until the entry is
//! older than the configured time-to-live.

mod products;

pub use products::{ALL_BRANDS, ProductIndex, ProductSummary};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::api::models::{CategoryList, ProductEntry};
use crate::api::{
    Category, Endpoint, ExplorerError, QueryParams, Quotas, ReviewsGateway, decode,
};
use crate::filters::FilterSet;

/// Default cache lifetime for reference data.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CachedResult {
    fetched_at: Instant,
    value: Value,
}

/// Cached reference-data fetcher.
pub struct ReferenceCatalog<'g, G: ReviewsGateway + ?Sized> {
    gateway: &'g G,
    ttl: Duration,
    cache: HashMap<(Endpoint, QueryParams), CachedResult>,
}

impl<'g, G: ReviewsGateway + ?Sized> ReferenceCatalog<'g, G> {
    /// Creates a catalog with the default time-to-live.
    #[must_use]
    pub fn new(gateway: &'g G) -> Self {
        Self::with_ttl(gateway, DEFAULT_CACHE_TTL)
    }

    /// Creates a catalog with an explicit time-to-live.
    #[must_use]
    pub fn with_ttl(gateway: &'g G, ttl: Duration) -> Self {
        Self {
            gateway,
            ttl,
            cache: HashMap::new(),
        }
    }

    /// Number of live cache entries.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache
            .values()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .count()
    }

    /// Fetches `endpoint`, serving repeated parameter tuples from the cache.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors; failures are never cached.
    pub fn fetch_cached(
        &mut self,
        endpoint: Endpoint,
        params: &QueryParams,
    ) -> Result<Value, ExplorerError> {
        let key = (endpoint, params.clone());
        if let Some(entry) = self.cache.get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                tracing::trace!(endpoint = %endpoint, "cache hit");
                return Ok(entry.value.clone());
            }
        }

        let value = self.gateway.fetch(endpoint, params)?;
        self.cache.insert(
            key,
            CachedResult {
                fetched_at: Instant::now(),
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Current quota usage. Always fetched fresh.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn quotas(&self) -> Result<Quotas, ExplorerError> {
        let value = self.gateway.fetch(Endpoint::Quotas, &QueryParams::new())?;
        decode(Endpoint::Quotas, value)
    }

    /// All categories with their subcategories.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn categories(&mut self) -> Result<Vec<Category>, ExplorerError> {
        let value = self.fetch_cached(Endpoint::Categories, &QueryParams::new())?;
        let list: CategoryList = decode(Endpoint::Categories, value)?;
        Ok(list.categories)
    }

    /// Subcategories of `category`; empty for unknown categories.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn subcategories(&mut self, category: &str) -> Result<Vec<String>, ExplorerError> {
        Ok(self
            .categories()?
            .into_iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.subcategories)
            .unwrap_or_default())
    }

    /// Brands, scoped by the category and subcategory of `filters`.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn brands(&mut self, filters: &FilterSet) -> Result<Vec<String>, ExplorerError> {
        self.names(Endpoint::Brands, &filters.scope_query(false))
    }

    /// All countries.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn countries(&mut self) -> Result<Vec<String>, ExplorerError> {
        self.names(Endpoint::Countries, &QueryParams::new())
    }

    /// All review sources.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn sources(&mut self) -> Result<Vec<String>, ExplorerError> {
        self.names(Endpoint::Sources, &QueryParams::new())
    }

    /// All markets.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn markets(&mut self) -> Result<Vec<String>, ExplorerError> {
        self.names(Endpoint::Markets, &QueryParams::new())
    }

    /// Attributes, scoped by category, subcategory, and brands.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors.
    pub fn attributes(&mut self, filters: &FilterSet) -> Result<Vec<String>, ExplorerError> {
        self.names(Endpoint::Attributes, &filters.scope_query(true))
    }

    fn names(
        &mut self,
        endpoint: Endpoint,
        params: &QueryParams,
    ) -> Result<Vec<String>, ExplorerError> {
        let value = self.fetch_cached(endpoint, params)?;
        extract_names(endpoint, value)
    }
}

/// Pulls the name list out of a list-shaped result.
fn extract_names(endpoint: Endpoint, mut value: Value) -> Result<Vec<String>, ExplorerError> {
    let Some(key) = endpoint.list_key() else {
        return Err(ExplorerError::Decode {
            endpoint: endpoint.path().to_owned(),
            message: "endpoint does not return a name list".to_owned(),
        });
    };
    let list = value.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    if list.is_null() {
        return Ok(Vec::new());
    }
    let entries: Vec<ProductEntry> = decode(endpoint, list)?;
    Ok(entries.into_iter().map(ProductEntry::into_name).collect())
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::api::MockReviewsGateway;

    #[rstest]
    fn repeated_lookups_hit_the_cache() {
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .with(eq(Endpoint::Countries), eq(QueryParams::new()))
            .times(1)
            .returning(|_, _| Ok(json!({"countries": ["France", "Spain"]})));

        let mut catalog = ReferenceCatalog::new(&gateway);
        let first = catalog.countries().expect("first lookup");
        let second = catalog.countries().expect("cached lookup");

        assert_eq!(first, vec!["France", "Spain"]);
        assert_eq!(first, second);
        assert_eq!(catalog.cached_entries(), 1);
    }

    #[rstest]
    fn distinct_parameter_tuples_are_cached_separately() {
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .withf(|endpoint, _| *endpoint == Endpoint::Brands)
            .times(2)
            .returning(|_, params| {
                let brand = params.get("category").unwrap_or("any").to_owned();
                Ok(json!({"brands": [brand]}))
            });

        let mut catalog = ReferenceCatalog::new(&gateway);
        let suncare = FilterSet {
            category: Some("suncare".to_owned()),
            ..FilterSet::default()
        };
        let everything = FilterSet::default();

        assert_eq!(catalog.brands(&suncare).expect("suncare"), vec!["suncare"]);
        assert_eq!(catalog.brands(&everything).expect("all"), vec!["any"]);
        assert_eq!(catalog.brands(&suncare).expect("cached"), vec!["suncare"]);
    }

    #[rstest]
    fn expired_entries_are_refetched() {
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .times(2)
            .returning(|_, _| Ok(json!({"markets": ["pharmacy"]})));

        let mut catalog = ReferenceCatalog::with_ttl(&gateway, Duration::ZERO);
        catalog.markets().expect("first");
        catalog.markets().expect("second");
        assert_eq!(catalog.cached_entries(), 0);
    }

    #[rstest]
    fn errors_are_not_cached() {
        let mut gateway = MockReviewsGateway::new();
        let mut calls = 0_u32;
        gateway.expect_fetch().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(ExplorerError::Network {
                    message: "down".to_owned(),
                })
            } else {
                Ok(json!({"sources": ["amazon"]}))
            }
        });

        let mut catalog = ReferenceCatalog::new(&gateway);
        assert!(catalog.sources().is_err());
        assert_eq!(catalog.sources().expect("retry succeeds"), vec!["amazon"]);
    }

    #[rstest]
    fn subcategories_follow_the_selected_category() {
        let mut gateway = MockReviewsGateway::new();
        gateway.expect_fetch().times(1).returning(|_, _| {
            Ok(json!({"categories": [
                {"category": "bodycare", "subcategories": ["body creams & milks"]},
                {"category": "suncare", "subcategories": ["face", "body"]}
            ]}))
        });

        let mut catalog = ReferenceCatalog::new(&gateway);
        assert_eq!(
            catalog.subcategories("suncare").expect("lookup"),
            vec!["face", "body"]
        );
        assert!(catalog.subcategories("haircare").expect("lookup").is_empty());
    }

    #[rstest]
    fn missing_list_key_yields_empty_list() {
        let mut gateway = MockReviewsGateway::new();
        gateway.expect_fetch().returning(|_, _| Ok(json!({})));

        let mut catalog = ReferenceCatalog::new(&gateway);
        assert!(catalog.countries().expect("lookup").is_empty());
    }
}
