//! Identity wrappers for API access.

use url::Url;

use super::error::ExplorerError;

/// Default base URL of the Ratings & Reviews API.
pub const DEFAULT_BASE_URL: &str = "https://api-pf.ratingsandreviews-beauty.com";

/// API token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ExplorerError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ExplorerError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ExplorerError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

// Tokens end up in logs through `Debug` otherwise.
impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Parsed API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(Url);

impl ApiBase {
    /// Parses a base URL, requiring an http(s) scheme and a host.
    ///
    /// # Errors
    ///
    /// Returns `ExplorerError::InvalidUrl` when the value is not an absolute
    /// http(s) URL.
    pub fn parse(value: &str) -> Result<Self, ExplorerError> {
        let parsed =
            Url::parse(value.trim()).map_err(|error| ExplorerError::InvalidUrl(error.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExplorerError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ExplorerError::InvalidUrl("URL must include a host".to_owned()));
        }
        Ok(Self(parsed))
    }

    /// Joins an endpoint path (for example `/reviews`) onto the base.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.0.clone();
        let base_path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{base_path}{path}"));
        url
    }

    /// Borrow the underlying URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}
