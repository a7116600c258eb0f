//! Gateways for calling the Ratings & Reviews API.
//!
//! The trait keeps the export engine and catalog independent of HTTP so they
//! can be driven by mocks in tests, while [`HttpGateway`] performs the real
//! blocking requests.

mod http;

pub use http::{HttpGateway, HttpGatewayConfig};

use serde_json::Value;

use super::error::ExplorerError;
use super::models::Endpoint;
use super::query::QueryParams;

/// Gateway that can issue one GET request against an endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait ReviewsGateway: Send + Sync {
    /// Fetch `endpoint` with `params` and return the unwrapped `result` value.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError`] for transport failures, non-200 responses, or
    /// bodies that are not a JSON envelope.
    fn fetch(&self, endpoint: Endpoint, params: &QueryParams) -> Result<Value, ExplorerError>;
}
