//! Session-request dispatch.
//!
//! The upload session client talks to the node only through [`Dispatcher`]:
//! send a named operation with positional string arguments and request
//! options, get back the raw response body or an error. Transport, retries
//! and cancellation belong to the dispatcher implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::Result;

#[cfg(feature = "http-dispatcher")]
mod http;

#[cfg(feature = "http-dispatcher")]
pub use http::HttpDispatcher;

/// Start an upload (online or offline-signed).
pub const OP_UPLOAD: &str = "storage/upload";
/// Poll the status of an upload session.
pub const OP_UPLOAD_STATUS: &str = "storage/upload/status";
/// Fetch the contract batch awaiting the client's signatures.
pub const OP_GET_CONTRACT_BATCH: &str = "storage/upload/getcontractbatch";
/// Fetch the payload awaiting the client's signature.
pub const OP_GET_UNSIGNED: &str = "storage/upload/getunsigned";
/// Submit a signed contract batch.
pub const OP_SIGN_BATCH: &str = "storage/upload/signbatch";
/// Submit a signed artifact.
pub const OP_SIGN: &str = "storage/upload/sign";

/// A named operation with positional arguments and named options.
///
/// Argument order is significant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionRequest {
    pub operation: String,
    pub args: Vec<String>,
    pub options: BTreeMap<String, String>,
}

impl SessionRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a named option, replacing any earlier value.
    pub fn option(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.options.insert(name.into(), value.to_string());
        self
    }

    /// Apply upload options in order; later options win.
    pub fn with_options(self, options: &[UploadOption]) -> Self {
        options.iter().fold(self, |rb, opt| opt.apply(rb))
    }
}

/// Options recognised by `storage/upload`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadOption {
    /// Storage length in days.
    StorageLength(u32),
    /// Ask the node to hand signing work back to the client.
    OfflineSignMode(bool),
}

impl UploadOption {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StorageLength(_) => "storage-length",
            Self::OfflineSignMode(_) => "offline-sign-mode",
        }
    }

    pub fn apply(&self, request: SessionRequest) -> SessionRequest {
        match *self {
            Self::StorageLength(days) => request.option(self.name(), days),
            Self::OfflineSignMode(enabled) => request.option(self.name(), enabled),
        }
    }
}

/// Sends session requests to the storage node.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Perform one round-trip and return the raw response body.
    ///
    /// Node-side failures are reported as
    /// [`OffsignError::Remote`](crate::OffsignError::Remote) and connection
    /// failures as [`OffsignError::Transport`](crate::OffsignError::Transport).
    async fn dispatch(&self, request: SessionRequest) -> Result<Vec<u8>>;
}

#[async_trait]
impl<D: Dispatcher + ?Sized> Dispatcher for std::sync::Arc<D> {
    async fn dispatch(&self, request: SessionRequest) -> Result<Vec<u8>> {
        (**self).dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_keeps_argument_order() {
        let request = SessionRequest::new(OP_GET_UNSIGNED)
            .arg("sid")
            .arg("peer")
            .arg("123")
            .arg("tag")
            .arg("status");
        assert_eq!(request.operation, "storage/upload/getunsigned");
        assert_eq!(request.args, vec!["sid", "peer", "123", "tag", "status"]);
        assert!(request.options.is_empty());
    }

    #[test]
    fn test_upload_options_applied() {
        let request = SessionRequest::new(OP_UPLOAD).with_options(&[
            UploadOption::StorageLength(30),
            UploadOption::OfflineSignMode(true),
        ]);
        assert_eq!(request.options.get("storage-length").map(String::as_str), Some("30"));
        assert_eq!(request.options.get("offline-sign-mode").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_later_option_wins() {
        let request = SessionRequest::new(OP_UPLOAD).with_options(&[
            UploadOption::StorageLength(30),
            UploadOption::StorageLength(90),
        ]);
        assert_eq!(request.options.get("storage-length").map(String::as_str), Some("90"));
    }
}
