//! Product listing operation.

use std::io;

use review_explorer::{ExplorerConfig, ExplorerError, ReferenceCatalog};

use super::output::write_products;

/// Lists the products of each selected brand.
///
/// With `--with-counts`, each product is annotated with its review count
/// and the listing is sorted by it.
///
/// # Errors
///
/// Returns filter loading errors, and gateway or decoding errors from
/// `/products`.
pub fn run(config: &ExplorerConfig) -> Result<(), ExplorerError> {
    let filters = config.resolve_filters()?;
    let gateway = super::gateway(config)?;
    let mut catalog = ReferenceCatalog::with_ttl(&gateway, config.cache_ttl());

    let mut index = catalog.product_index(&filters, config.with_counts)?;
    if config.with_counts {
        index.sort_by_reviews();
    }
    write_products(&mut io::stdout().lock(), &index)
}
