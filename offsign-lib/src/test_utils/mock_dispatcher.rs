//! Scripted dispatcher that records every request.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::dispatch::{Dispatcher, SessionRequest};
use crate::{OffsignError, Result};

/// In-memory [`Dispatcher`] for tests.
///
/// Responses are queued per operation and consumed in order. A request with
/// nothing queued fails with a remote error naming the operation.
#[derive(Default)]
pub struct MockDispatcher {
    requests: Mutex<Vec<SessionRequest>>,
    responses: Mutex<HashMap<String, VecDeque<Result<Vec<u8>>>>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response body for `operation`.
    pub fn respond_raw(&self, operation: &str, body: impl Into<Vec<u8>>) {
        self.push(operation, Ok(body.into()));
    }

    /// Queue a JSON response body for `operation`.
    pub fn respond_json(&self, operation: &str, body: serde_json::Value) {
        self.respond_raw(operation, body.to_string());
    }

    /// Queue a failure for `operation`.
    pub fn fail(&self, operation: &str, error: OffsignError) {
        self.push(operation, Err(error));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<SessionRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }

    /// Requests received for one operation.
    pub fn requests_for(&self, operation: &str) -> Vec<SessionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation == operation)
            .collect()
    }

    pub fn last_request(&self) -> Option<SessionRequest> {
        self.requests.lock().expect("lock poisoned").last().cloned()
    }

    fn push(&self, operation: &str, response: Result<Vec<u8>>) {
        self.responses
            .lock()
            .expect("lock poisoned")
            .entry(operation.to_string())
            .or_default()
            .push_back(response);
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn dispatch(&self, request: SessionRequest) -> Result<Vec<u8>> {
        let operation = request.operation.clone();
        self.requests.lock().expect("lock poisoned").push(request);

        self.responses
            .lock()
            .expect("lock poisoned")
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(OffsignError::remote(&operation, "no scripted response")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responses_consumed_in_order() {
        let dispatcher = MockDispatcher::new();
        dispatcher.respond_raw("op", b"one".to_vec());
        dispatcher.respond_raw("op", b"two".to_vec());

        let request = SessionRequest::new("op").arg("x");
        assert_eq!(dispatcher.dispatch(request.clone()).await.unwrap(), b"one");
        assert_eq!(dispatcher.dispatch(request.clone()).await.unwrap(), b"two");
        assert!(dispatcher.dispatch(request).await.is_err());
        assert_eq!(dispatcher.requests_for("op").len(), 3);
    }
}
