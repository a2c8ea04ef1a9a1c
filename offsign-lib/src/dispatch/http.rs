//! HTTP dispatcher for the node's command API.
//!
//! Every operation is a `POST {api_url}/api/v1/{operation}` with positional
//! arguments as repeated `arg` query parameters and options as named query
//! parameters. A non-2xx answer carries a JSON body with a `Message` field.
//!
//! # Feature Flags
//!
//! ```toml
//! [dependencies]
//! offsign-lib = { version = "1.0", features = ["http-dispatcher"] }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Dispatcher, SessionRequest};
use crate::config::ClientConfig;
use crate::{OffsignError, Result};

/// Error body returned by the node.
#[derive(Debug, Deserialize)]
struct NodeError {
    #[serde(rename = "Message", default)]
    message: String,
}

/// [`Dispatcher`] backed by `reqwest`.
pub struct HttpDispatcher {
    api_url: String,
    client: reqwest::Client,
}

impl HttpDispatcher {
    /// Create a dispatcher for the configured node.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OffsignError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.clone(),
            client,
        })
    }

    /// Build the full URL for an operation.
    fn url(&self, operation: &str) -> String {
        format!(
            "{}/api/v1/{}",
            self.api_url.trim_end_matches('/'),
            operation.trim_start_matches('/')
        )
    }

    fn query(request: &SessionRequest) -> Vec<(&str, &str)> {
        request
            .args
            .iter()
            .map(|arg| ("arg", arg.as_str()))
            .chain(
                request
                    .options
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            )
            .collect()
    }

    fn map_status_error(operation: &str, status: u16, body: &[u8]) -> OffsignError {
        let message = serde_json::from_slice::<NodeError>(body)
            .ok()
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                let text = String::from_utf8_lossy(body);
                if text.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    text.trim().to_string()
                }
            });
        OffsignError::remote(operation, message)
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, request), fields(operation = %request.operation, args = request.args.len())))]
    async fn dispatch(&self, request: SessionRequest) -> Result<Vec<u8>> {
        let url = self.url(&request.operation);

        let response = self
            .client
            .post(&url)
            .query(&Self::query(&request))
            .send()
            .await
            .map_err(|e| OffsignError::Transport(format!("{}: {}", request.operation, e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| OffsignError::Transport(format!("failed to read response: {}", e)))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status = status.as_u16(), len = body.len(), "node responded");

        if !status.is_success() {
            return Err(Self::map_status_error(
                &request.operation,
                status.as_u16(),
                &body,
            ));
        }

        Ok(body.to_vec())
    }
}
