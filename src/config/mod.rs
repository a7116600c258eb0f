//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.review-explorer.toml` in current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `REVIEW_EXPLORER_*`, plus the legacy
//!    `API_TOKEN` for the token
//! 4. **Command-line arguments** – `--token`/`-t`, `--operation`/`-o`, ...
//!
//! # Configuration File
//!
//! ```toml
//! token = "your-api-token"
//! operation = "export"
//! filters = "filters.json"
//! rows = 500
//! full_export = true
//! export_format = "csv"
//! output = "exports/reviews.csv"
//! ```

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::api::{ApiBase, ApiToken, DEFAULT_BASE_URL, ExplorerError, HttpGatewayConfig};
use crate::catalog::DEFAULT_CACHE_TTL;
use crate::export::{
    DEFAULT_LOG_FILE, DEFAULT_MAX_PAGES, DEFAULT_ROWS, ExportFormat, ExportMode, ExportSettings,
    MAX_PREVIEW_CAP,
};
use crate::files;
use crate::filters::FilterSet;
use crate::results::DEFAULT_PAGE_SIZE;

/// Legacy environment variable holding the API token.
pub const LEGACY_TOKEN_VAR: &str = "API_TOKEN";

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// What the explorer should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    /// Show quota usage.
    #[default]
    Quotas,
    /// List reference data: categories, brands, countries, and so on.
    Catalog,
    /// List products per brand, optionally with review counts.
    Products,
    /// Browse one page of matching reviews.
    Browse,
    /// Preview or fully export matching reviews.
    Export,
}

impl FromStr for OperationMode {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quotas" => Ok(Self::Quotas),
            "catalog" | "reference" => Ok(Self::Catalog),
            "products" => Ok(Self::Products),
            "browse" | "reviews" => Ok(Self::Browse),
            "export" => Ok(Self::Export),
            _ => Err(ExplorerError::Configuration {
                message: format!(
                    "unsupported operation '{s}': valid options are 'quotas', 'catalog', \
                     'products', 'browse', or 'export'"
                ),
            }),
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quotas => "quotas",
            Self::Catalog => "catalog",
            Self::Products => "products",
            Self::Browse => "browse",
            Self::Export => "export",
        };
        f.write_str(name)
    }
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `REVIEW_EXPLORER_TOKEN`, `API_TOKEN`, or `--token`: API token
/// - `REVIEW_EXPLORER_BASE_URL` or `--base-url`: API base URL
/// - `REVIEW_EXPLORER_OPERATION` or `--operation`: operation to run
/// - `REVIEW_EXPLORER_FILTERS` or `--filters`: filter JSON file
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use review_explorer::ExplorerConfig;
///
/// let config = ExplorerConfig::load().expect("failed to load configuration");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "REVIEW_EXPLORER",
    discovery(
        dotfile_name = ".review-explorer.toml",
        config_file_name = "review-explorer.toml",
        app_name = "review-explorer"
    )
)]
pub struct ExplorerConfig {
    /// API token sent as the `token` query parameter.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `REVIEW_EXPLORER_TOKEN` or `API_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// API base URL; defaults to the production host.
    #[ortho_config()]
    pub base_url: Option<String>,

    /// Operation to run: `quotas` (default), `catalog`, `products`,
    /// `browse`, or `export`.
    #[ortho_config(cli_short = 'o')]
    pub operation: Option<String>,

    /// Path to a filter JSON file.
    #[ortho_config(cli_short = 'f')]
    pub filters: Option<String>,

    /// Inline filter JSON; conflicts with `filters`.
    #[ortho_config()]
    pub filters_json: Option<String>,

    /// Rows per `/reviews` page (10 to 1000).
    #[ortho_config()]
    pub rows: u32,

    /// Seed for server-side random sampling.
    #[ortho_config()]
    pub random_seed: Option<u64>,

    /// Follows the cursor to the end instead of fetching a preview page.
    ///
    /// Note: booleans are not read from the environment by `ortho_config`.
    #[ortho_config()]
    pub full_export: bool,

    /// Documents kept by a preview (50 to 100).
    #[ortho_config()]
    pub preview_cap: u32,

    /// Iteration ceiling for full exports (1 to 200).
    #[ortho_config()]
    pub max_pages: u32,

    /// Export format: `csv` or `xlsx` (flattened), or `jsonl` (raw).
    #[ortho_config()]
    pub export_format: Option<String>,

    /// Output file; stdout when unset. A trailing `/` places a generated
    /// file name in that directory.
    #[ortho_config()]
    pub output: Option<String>,

    /// Export log location.
    #[ortho_config()]
    pub export_log: Option<String>,

    /// Annotates product listings with review counts from `/metrics`.
    #[ortho_config()]
    pub with_counts: bool,

    /// Results page to show (1-based).
    #[ortho_config()]
    pub page: u32,

    /// Documents per results page.
    #[ortho_config()]
    pub page_size: u32,

    /// HTTP timeout for API calls, in seconds.
    #[ortho_config()]
    pub request_timeout_seconds: u64,

    /// Lifetime of cached reference data, in seconds.
    #[ortho_config()]
    pub cache_ttl_seconds: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: None,
            operation: None,
            filters: None,
            filters_json: None,
            rows: DEFAULT_ROWS,
            random_seed: None,
            full_export: false,
            preview_cap: MAX_PREVIEW_CAP,
            max_pages: DEFAULT_MAX_PAGES,
            export_format: None,
            output: None,
            export_log: None,
            with_counts: false,
            page: 1,
            page_size: u32::try_from(DEFAULT_PAGE_SIZE).unwrap_or(u32::MAX),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            cache_ttl_seconds: DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

impl ExplorerConfig {
    /// Resolves the token from configuration or the legacy `API_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::MissingToken`] when no source provides a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<ApiToken, ExplorerError> {
        let value = self
            .token
            .clone()
            .or_else(|| env::var(LEGACY_TOKEN_VAR).ok())
            .ok_or(ExplorerError::MissingToken)?;
        ApiToken::new(value)
    }

    /// Parses the configured base URL, or the default host.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidUrl`] for malformed URLs.
    pub fn api_base(&self) -> Result<ApiBase, ExplorerError> {
        ApiBase::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    /// Builds the HTTP gateway configuration.
    ///
    /// # Errors
    ///
    /// Propagates token and base URL errors.
    pub fn gateway_config(&self) -> Result<HttpGatewayConfig, ExplorerError> {
        Ok(HttpGatewayConfig::new(self.api_base()?, self.resolve_token()?)
            .with_timeout(Duration::from_secs(self.request_timeout_seconds)))
    }

    /// Determines the operation; `quotas` when none is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Configuration`] for unknown operations.
    pub fn operation_mode(&self) -> Result<OperationMode, ExplorerError> {
        self.operation
            .as_deref()
            .map_or(Ok(OperationMode::default()), str::parse)
    }

    /// Export format; CSV when none is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Configuration`] for unknown formats.
    pub fn export_format(&self) -> Result<ExportFormat, ExplorerError> {
        self.export_format
            .as_deref()
            .map_or(Ok(ExportFormat::Csv), str::parse)
    }

    /// Loads filters from inline JSON or the filter file; empty filters
    /// when neither is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Configuration`] when both sources are set,
    /// [`ExplorerError::Io`] when the file cannot be read, and the loader's
    /// errors for invalid JSON.
    pub fn resolve_filters(&self) -> Result<FilterSet, ExplorerError> {
        match (self.filters_json.as_deref(), self.filters.as_deref()) {
            (Some(_), Some(_)) => Err(conflicting_filters()),
            (Some(inline), None) => FilterSet::from_json(inline),
            (None, Some(path)) => {
                let contents = files::read_required(&files::utf8_path(path), "filter")?;
                FilterSet::from_json(&contents)
            }
            (None, None) => Ok(FilterSet::default()),
        }
    }

    /// Validated export sizing.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidPagination`] for out-of-range values.
    pub fn export_settings(&self) -> Result<ExportSettings, ExplorerError> {
        let mode = if self.full_export {
            ExportMode::Full
        } else {
            ExportMode::Preview
        };
        Ok(ExportSettings::new(self.rows, mode)?
            .with_preview_cap(self.preview_cap)?
            .with_max_pages(self.max_pages)?
            .with_seed(self.random_seed))
    }

    /// Reference-data cache lifetime.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Export log location.
    #[must_use]
    pub fn export_log_path(&self) -> Utf8PathBuf {
        files::utf8_path(self.export_log.as_deref().unwrap_or(DEFAULT_LOG_FILE))
    }

    /// Results page size.
    #[must_use]
    pub fn results_page_size(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(usize::MAX)
    }

    /// Checks the configuration for inconsistent or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Configuration`] or
    /// [`ExplorerError::InvalidPagination`] describing the first problem.
    pub fn validate(&self) -> Result<(), ExplorerError> {
        if self.filters.is_some() && self.filters_json.is_some() {
            return Err(conflicting_filters());
        }
        if self.request_timeout_seconds == 0 {
            return Err(ExplorerError::Configuration {
                message: "request_timeout_seconds must be at least 1".to_owned(),
            });
        }
        if self.page == 0 || self.page_size == 0 {
            return Err(ExplorerError::InvalidPagination {
                message: "page and page_size must be at least 1".to_owned(),
            });
        }
        self.operation_mode()?;
        self.export_format()?;
        self.export_settings()?;
        Ok(())
    }
}

fn conflicting_filters() -> ExplorerError {
    ExplorerError::Configuration {
        message: "use either --filters or --filters-json, not both".to_owned(),
    }
}

#[cfg(test)]
mod tests;
