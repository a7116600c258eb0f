//! Ratings & Reviews API access.
//!
//! This module wraps the vendor REST API: token and base URL validation,
//! query-parameter maps, the gateway trait with its blocking HTTP
//! implementation, and the decoded response payloads.

pub mod error;
pub mod gateway;
pub mod models;
pub mod query;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod token;

pub use error::ExplorerError;
pub use gateway::{HttpGateway, HttpGatewayConfig, ReviewsGateway};
pub use models::{
    Category, Endpoint, MetricsSummary, Quotas, ReviewDocument, ReviewPage, decode, display_value,
};
pub use query::{QueryParams, is_unconstrained};
pub use token::{ApiBase, ApiToken, DEFAULT_BASE_URL};

#[cfg(test)]
pub use gateway::MockReviewsGateway;
