//! Blocking HTTP implementation of [`ReviewsGateway`].

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::api::error::ExplorerError;
use crate::api::models::{Endpoint, Envelope};
use crate::api::query::QueryParams;
use crate::api::token::{ApiBase, ApiToken};

use super::ReviewsGateway;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ERROR_BODY_CHARS: usize = 160;

/// Configuration for [`HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGatewayConfig {
    /// API base URL.
    pub base: ApiBase,
    /// Token sent as the `token` query parameter.
    pub token: ApiToken,
    /// HTTP timeout per request.
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    /// Constructs configuration with the default timeout.
    #[must_use]
    pub const fn new(base: ApiBase, token: ApiToken) -> Self {
        Self {
            base,
            token,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `reqwest`-backed gateway.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpGateway {
    /// Builds a gateway and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, ExplorerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| ExplorerError::Configuration {
                message: format!("failed to configure HTTP client: {error}"),
            })?;
        Ok(Self { config, client })
    }

    fn request_url(&self, endpoint: Endpoint, params: &QueryParams) -> url::Url {
        let mut url = self.config.base.endpoint_url(endpoint.path());
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params.iter() {
                query.append_pair(key, value);
            }
            query.append_pair("token", self.config.token.value());
        }
        url
    }
}

impl ReviewsGateway for HttpGateway {
    fn fetch(&self, endpoint: Endpoint, params: &QueryParams) -> Result<Value, ExplorerError> {
        let url = self.request_url(endpoint, params);
        tracing::debug!(endpoint = %endpoint, params = params.len(), "requesting");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|error| ExplorerError::Network {
                message: format!("{endpoint} request failed: {}", error.without_url()),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), ERROR_BODY_CHARS),
            );
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), "request rejected");
            return Err(map_status(endpoint, status, body));
        }

        let envelope: Envelope = response.json().map_err(|error| ExplorerError::Decode {
            endpoint: endpoint.path().to_owned(),
            message: error.to_string(),
        })?;
        Ok(envelope.result)
    }
}

fn map_status(endpoint: Endpoint, status: StatusCode, body: String) -> ExplorerError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ExplorerError::Authentication { message: body }
        }
        _ => ExplorerError::Api {
            endpoint: endpoint.path().to_owned(),
            status: status.as_u16(),
            message: body,
        },
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}
