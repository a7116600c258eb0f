//! Reference data listing operation.

use std::io::{self, Write};

use review_explorer::{ExplorerConfig, ExplorerError, ReferenceCatalog};

use super::output::{io_error, write_categories, write_name_list};

/// Lists categories, brands, countries, sources, markets, and attributes.
///
/// Brands are scoped by the filters' category and subcategory; attributes
/// additionally by the selected brands.
///
/// # Errors
///
/// Returns filter loading errors, and gateway or decoding errors from any
/// reference endpoint.
pub fn run(config: &ExplorerConfig) -> Result<(), ExplorerError> {
    let filters = config.resolve_filters()?;
    let gateway = super::gateway(config)?;
    let mut catalog = ReferenceCatalog::with_ttl(&gateway, config.cache_ttl());

    let categories = catalog.categories()?;
    let sections = [
        ("Brands", catalog.brands(&filters)?),
        ("Countries", catalog.countries()?),
        ("Sources", catalog.sources()?),
        ("Markets", catalog.markets()?),
        ("Attributes", catalog.attributes(&filters)?),
    ];
    tracing::debug!(cached = catalog.cached_entries(), "reference data loaded");

    let mut stdout = io::stdout().lock();
    write_categories(&mut stdout, &categories)?;
    for (title, names) in &sections {
        writeln!(stdout).map_err(|e| io_error(&e))?;
        write_name_list(&mut stdout, title, names)?;
    }
    Ok(())
}
