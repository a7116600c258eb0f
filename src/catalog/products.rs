//! Brand → product index, optionally annotated with review counts.

use crate::api::{
    Endpoint, ExplorerError, MetricsSummary, QueryParams, ReviewsGateway, decode, is_unconstrained,
};
use crate::filters::{DATE_FORMAT, FilterSet, keys};

use super::{ReferenceCatalog, extract_names};

/// Label used when products are listed without a brand constraint.
pub const ALL_BRANDS: &str = "ALL";

/// A product available for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    /// Brand the product was listed under.
    pub brand: String,
    /// Product name as used in the `product` filter.
    pub name: String,
    /// Number of reviews matching the filters, when counts were requested
    /// and the `/metrics` lookup succeeded.
    pub review_count: Option<u64>,
}

/// Products grouped by brand, in brand order of the filter set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductIndex {
    products: Vec<ProductSummary>,
}

impl ProductIndex {
    /// Builds an index from a flat product list.
    #[must_use]
    pub const fn new(products: Vec<ProductSummary>) -> Self {
        Self { products }
    }

    /// All products.
    #[must_use]
    pub fn products(&self) -> &[ProductSummary] {
        &self.products
    }

    /// Products listed under `brand`.
    pub fn for_brand<'a>(&'a self, brand: &'a str) -> impl Iterator<Item = &'a ProductSummary> {
        self.products
            .iter()
            .filter(move |product| product.brand == brand)
    }

    /// Distinct brands in first-seen order.
    #[must_use]
    pub fn brands(&self) -> Vec<&str> {
        let mut brands: Vec<&str> = Vec::new();
        for product in &self.products {
            if !brands.contains(&product.brand.as_str()) {
                brands.push(product.brand.as_str());
            }
        }
        brands
    }

    /// Case-insensitive substring search on product names.
    #[must_use]
    pub fn search(&self, text: &str) -> Vec<&ProductSummary> {
        let needle = text.to_lowercase();
        self.products
            .iter()
            .filter(|product| product.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Sorts by review count, most reviewed first; unknown counts last.
    pub fn sort_by_reviews(&mut self) {
        self.products
            .sort_by(|left, right| right.review_count.cmp(&left.review_count));
    }

    /// Number of products.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true when no product matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<G: ReviewsGateway + ?Sized> ReferenceCatalog<'_, G> {
    /// Lists products for each selected brand.
    ///
    /// Without a brand constraint a single unscoped lookup is made and its
    /// products are filed under [`ALL_BRANDS`]. When `with_counts` is set, each
    /// product is annotated with its `/metrics` review count; a failed count
    /// lookup leaves the count empty instead of failing the listing.
    ///
    /// # Errors
    ///
    /// Propagates gateway and decoding errors from `/products`.
    pub fn product_index(
        &mut self,
        filters: &FilterSet,
        with_counts: bool,
    ) -> Result<ProductIndex, ExplorerError> {
        let brands: Vec<&str> = filters
            .brand
            .iter()
            .map(String::as_str)
            .filter(|brand| !is_unconstrained(brand))
            .collect();
        let scopes: Vec<Option<&str>> = if brands.is_empty() {
            vec![None]
        } else {
            brands.into_iter().map(Some).collect()
        };

        let mut products = Vec::new();
        for brand in scopes {
            let params = product_query(filters, brand);
            let value = self.fetch_cached(Endpoint::Products, &params)?;
            for name in extract_names(Endpoint::Products, value)? {
                let review_count = if with_counts {
                    self.review_count(&params, &name)
                } else {
                    None
                };
                products.push(ProductSummary {
                    brand: brand.unwrap_or(ALL_BRANDS).to_owned(),
                    name,
                    review_count,
                });
            }
        }

        tracing::debug!(products = products.len(), "resolved product index");
        Ok(ProductIndex::new(products))
    }

    fn review_count(&mut self, scope: &QueryParams, product: &str) -> Option<u64> {
        let params = scope.clone().with(keys::PRODUCT, product);
        let result = self
            .fetch_cached(Endpoint::Metrics, &params)
            .and_then(|value| decode::<MetricsSummary>(Endpoint::Metrics, value));
        match result {
            Ok(metrics) => Some(metrics.nb_docs),
            Err(error) => {
                tracing::warn!(product, "review count unavailable: {error}");
                None
            }
        }
    }
}

/// Query for `/products`: one brand plus dates, category, and subcategory.
fn product_query(filters: &FilterSet, brand: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    if let Some(brand_name) = brand {
        params.set(keys::BRAND, brand_name);
    }
    if let Some(start) = filters.start_date {
        params.set(keys::START_DATE, start.format(DATE_FORMAT).to_string());
    }
    if let Some(end) = filters.end_date {
        params.set(keys::END_DATE, end.format(DATE_FORMAT).to_string());
    }
    if let Some(category) = filters.effective_category() {
        params.set(keys::CATEGORY, category);
    }
    if let Some(subcategory) = filters.effective_subcategory() {
        params.set(keys::SUBCATEGORY, subcategory);
    }
    params
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::api::MockReviewsGateway;

    #[fixture]
    fn two_brands() -> FilterSet {
        FilterSet {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            category: Some("ALL".to_owned()),
            brand: vec!["AVENE".to_owned(), "BIODERMA".to_owned()],
            ..FilterSet::default()
        }
    }

    fn product_gateway() -> MockReviewsGateway {
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .withf(|endpoint, _| *endpoint == Endpoint::Products)
            .returning(|_, params| match params.get("brand") {
                Some("AVENE") => Ok(json!({"products": ["Cicalfate", "Cleanance"]})),
                Some("BIODERMA") => Ok(json!({"products": [{"name": "Sensibio"}]})),
                _ => Ok(json!({"products": []})),
            });
        gateway
    }

    #[rstest]
    fn builds_index_per_brand(two_brands: FilterSet) {
        let gateway = product_gateway();
        let mut catalog = ReferenceCatalog::new(&gateway);

        let index = catalog
            .product_index(&two_brands, false)
            .expect("index should build");

        assert_eq!(index.len(), 3);
        assert_eq!(index.brands(), vec!["AVENE", "BIODERMA"]);
        let avene: Vec<&str> = index
            .for_brand("AVENE")
            .map(|product| product.name.as_str())
            .collect();
        assert_eq!(avene, vec!["Cicalfate", "Cleanance"]);
        assert!(index.products().iter().all(|p| p.review_count.is_none()));
    }

    #[rstest]
    fn product_query_drops_all_sentinel_and_keeps_dates(two_brands: FilterSet) {
        let params = product_query(&two_brands, Some("AVENE"));
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![("brand", "AVENE"), ("start-date", "2025-01-01")]
        );
    }

    #[rstest]
    fn counts_come_from_metrics_and_failures_degrade(two_brands: FilterSet) {
        let mut gateway = product_gateway();
        gateway
            .expect_fetch()
            .withf(|endpoint, _| *endpoint == Endpoint::Metrics)
            .returning(|_, params| match params.get("product") {
                Some("Cicalfate") => Ok(json!({"nbDocs": 120})),
                Some("Cleanance") => Ok(json!({"nbDocs": 4})),
                _ => Err(ExplorerError::Network {
                    message: "timeout".to_owned(),
                }),
            });
        let mut catalog = ReferenceCatalog::new(&gateway);

        let mut index = catalog
            .product_index(&two_brands, true)
            .expect("index should build");
        index.sort_by_reviews();

        let counts: Vec<(&str, Option<u64>)> = index
            .products()
            .iter()
            .map(|p| (p.name.as_str(), p.review_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("Cicalfate", Some(120)),
                ("Cleanance", Some(4)),
                ("Sensibio", None)
            ]
        );
    }

    #[rstest]
    fn unscoped_listing_uses_all_label() {
        let gateway = product_gateway();
        let mut catalog = ReferenceCatalog::new(&gateway);

        let index = catalog
            .product_index(&FilterSet::default(), false)
            .expect("index should build");
        assert!(index.is_empty());
    }

    #[rstest]
    fn search_is_case_insensitive() {
        let index = ProductIndex::new(vec![
            ProductSummary {
                brand: "AVENE".to_owned(),
                name: "Cicalfate+ Cream".to_owned(),
                review_count: None,
            },
            ProductSummary {
                brand: "AVENE".to_owned(),
                name: "Cleanance Gel".to_owned(),
                review_count: None,
            },
        ]);

        let hits: Vec<&str> = index
            .search("CREAM")
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Cicalfate+ Cream"]);
    }
}
