//! Shared test utilities.

use std::time::Duration;

use camino::Utf8PathBuf;
use review_explorer::api::HttpGatewayConfig;
use review_explorer::{ApiBase, ApiToken, HttpGateway};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token the mock API expects.
pub const TEST_TOKEN: &str = "test-token";

/// A mock Ratings & Reviews API and a gateway pointed at it.
///
/// The runtime drives the mock server on its worker threads while the
/// blocking gateway is called from the test thread.
pub struct ApiServer {
    runtime: Runtime,
    server: MockServer,
}

impl ApiServer {
    /// Starts a mock server.
    ///
    /// # Panics
    ///
    /// Panics if the runtime cannot be created.
    pub fn start() -> Self {
        let runtime = Runtime::new()
            .unwrap_or_else(|error| panic!("failed to start runtime: {error}"));
        let server = runtime.block_on(MockServer::start());
        Self { runtime, server }
    }

    /// Mounts `mock` on the server.
    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Builds a gateway for the mock server.
    ///
    /// # Panics
    ///
    /// Panics if the server URI or token is rejected.
    pub fn gateway(&self) -> HttpGateway {
        let base = ApiBase::parse(&self.server.uri())
            .unwrap_or_else(|error| panic!("mock server URI should parse: {error}"));
        let token = ApiToken::new(TEST_TOKEN)
            .unwrap_or_else(|error| panic!("token should be valid: {error}"));
        HttpGateway::new(HttpGatewayConfig::new(base, token).with_timeout(Duration::from_secs(5)))
            .unwrap_or_else(|error| panic!("gateway should build: {error}"))
    }

    /// Number of requests the server received for `path`.
    pub fn requests_to(&self, path: &str) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == path)
            .count()
    }
}

/// Wraps `result` in the API's response envelope.
pub fn envelope(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": result }))
}

/// Creates a temporary directory.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"))
}

/// UTF-8 path of `name` inside `dir`.
///
/// # Panics
///
/// Panics if the temporary path is not UTF-8.
pub fn temp_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name))
        .unwrap_or_else(|path| panic!("temporary path should be UTF-8: {}", path.display()))
}
