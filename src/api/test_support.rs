//! Canned-response gateway for tests outside this crate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use super::error::ExplorerError;
use super::gateway::ReviewsGateway;
use super::models::Endpoint;
use super::query::QueryParams;

type Response = Result<Value, ExplorerError>;

/// Gateway that replays queued responses per endpoint and records every
/// request it receives.
///
/// The last queued response of an endpoint is repeated once the queue
/// drains; an endpoint with nothing queued answers with a 404 error.
#[derive(Debug, Default)]
pub struct StubGateway {
    responses: Mutex<HashMap<Endpoint, VecDeque<Response>>>,
    requests: Mutex<Vec<(Endpoint, QueryParams)>>,
}

impl StubGateway {
    /// Creates a gateway with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for `endpoint`.
    #[must_use]
    pub fn with_response(self, endpoint: Endpoint, response: Response) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(endpoint)
            .or_default()
            .push_back(response);
        self
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<(Endpoint, QueryParams)> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests made against `endpoint`.
    #[must_use]
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(called, _)| *called == endpoint)
            .count()
    }
}

impl ReviewsGateway for StubGateway {
    fn fetch(&self, endpoint: Endpoint, params: &QueryParams) -> Result<Value, ExplorerError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((endpoint, params.clone()));

        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = responses.entry(endpoint).or_default();
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.unwrap_or_else(|| {
            Err(ExplorerError::Api {
                endpoint: endpoint.path().to_owned(),
                status: 404,
                message: "no stubbed response".to_owned(),
            })
        })
    }
}
