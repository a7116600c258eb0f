//! Error types exposed by the explorer.

use thiserror::Error;

/// Errors surfaced while parsing input, talking to the Ratings & Reviews API,
/// or writing exports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExplorerError {
    /// No API token was configured.
    #[error("API token is required (use --token, REVIEW_EXPLORER_TOKEN, or API_TOKEN)")]
    MissingToken,

    /// The API base URL could not be parsed.
    #[error("API base URL is invalid: {0}")]
    InvalidUrl(String),

    /// The API rejected the token.
    #[error("the API rejected the token: {message}")]
    Authentication {
        /// Response body returned with the 401/403 response.
        message: String,
    },

    /// The API answered with a non-200 status.
    #[error("API error on {endpoint} (status {status}): {message}")]
    Api {
        /// Endpoint path that failed.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// Networking failed while calling the API.
    #[error("network error talking to the API: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The response body did not match the expected envelope.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path whose payload could not be decoded.
        endpoint: String,
        /// Decoder error detail.
        message: String,
    },

    /// A pasted filter configuration was not valid JSON.
    #[error(
        "filter JSON error at line {line}, column {column}: {message}\n\
         check that keys and values are quoted, pairs are comma separated, \
         dates use 'YYYY-MM-DD', and there is no trailing comma\nexample:\n{example}"
    )]
    InvalidFilterJson {
        /// 1-based line of the syntax error.
        line: usize,
        /// 1-based column of the syntax error.
        column: usize,
        /// Parser message.
        message: String,
        /// A valid payload shown to the user.
        example: String,
    },

    /// A filter configuration was structurally wrong (not an object, bad types).
    #[error("invalid filter configuration: {message}")]
    InvalidFilters {
        /// Description of the problem.
        message: String,
    },

    /// A date could not be parsed.
    #[error("invalid date for {field}: '{value}'")]
    InvalidDate {
        /// Filter key carrying the date.
        field: String,
        /// Raw value supplied.
        value: String,
    },

    /// Invalid pagination or export sizing parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl ExplorerError {
    /// Wraps an I/O error with a short context prefix.
    pub(crate) fn io(context: &str, error: &std::io::Error) -> Self {
        Self::Io {
            message: format!("{context}: {error}"),
        }
    }
}
