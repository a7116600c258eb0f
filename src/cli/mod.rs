//! CLI operation mode handlers.
//!
//! This module contains the implementations for the different operations:
//! - [`quotas`]: Show API quota usage
//! - [`catalog`]: List reference data (categories, brands, countries, ...)
//! - [`products`]: List products per brand, optionally with review counts
//! - [`browse`]: Show one cursor page of matching reviews
//! - [`export`]: Preview or fully export matching reviews
//!
//! Output formatting utilities are in [`output`].

use review_explorer::{ExplorerConfig, ExplorerError, HttpGateway};

pub mod browse;
pub mod catalog;
pub mod export;
pub mod output;
pub mod products;
pub mod quotas;

/// Builds the HTTP gateway from configuration.
///
/// # Errors
///
/// Returns [`ExplorerError::MissingToken`] or [`ExplorerError::InvalidUrl`]
/// for unusable credentials, and [`ExplorerError::Configuration`] when the
/// HTTP client cannot be built.
pub fn gateway(config: &ExplorerConfig) -> Result<HttpGateway, ExplorerError> {
    HttpGateway::new(config.gateway_config()?)
}
