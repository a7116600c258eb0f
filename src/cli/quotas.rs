//! Quota usage operation.

use std::io;

use review_explorer::{ExplorerConfig, ExplorerError, ReferenceCatalog};

use super::output::write_quotas;

/// Shows the account's quota usage.
///
/// # Errors
///
/// Returns [`ExplorerError::MissingToken`] without a token, and gateway or
/// decoding errors from `/quotas`.
pub fn run(config: &ExplorerConfig) -> Result<(), ExplorerError> {
    let gateway = super::gateway(config)?;
    let catalog = ReferenceCatalog::with_ttl(&gateway, config.cache_ttl());
    let quotas = catalog.quotas()?;
    write_quotas(&mut io::stdout().lock(), &quotas)
}
