//! Review explorer library crate for the Ratings & Reviews API.
//!
//! The library validates API credentials, loads review filters from JSON,
//! looks up reference data through a time-bounded cache, resolves products
//! per brand, and exports matching reviews by walking the API's cursor
//! pagination. Exports are flattened to CSV or written raw as JSON Lines,
//! and completed full exports are recorded in a CSV log so overlapping
//! date ranges can be flagged.

pub mod api;
pub mod catalog;
pub mod config;
pub mod export;
pub mod files;
pub mod filters;
pub mod results;
pub mod state;

pub use api::{ApiBase, ApiToken, Endpoint, ExplorerError, HttpGateway, ReviewsGateway};
pub use catalog::{ProductIndex, ProductSummary, ReferenceCatalog};
pub use config::{ExplorerConfig, OperationMode};
pub use export::{ExportEngine, ExportFormat, ExportMode, ExportRequest, ExportSettings};
pub use filters::FilterSet;
pub use results::ResultsPager;
pub use state::{ExplorerMsg, ExplorerState};
