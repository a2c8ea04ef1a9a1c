//! Error types for offline signing operations.
//!
//! Every operation returns on the first failure; nothing here is retried by
//! the library itself.

/// Error codes for FFI and CLI exit mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OffsignErrorCode {
    /// No private key configured
    MissingKey = 1000,
    /// Private key could not be parsed
    KeyDecoding = 1001,
    /// Public key could not be derived
    KeyDerivation = 1002,
    /// Signing operation failed
    Signing = 2000,
    /// Unsigned payload did not match the expected structure
    Decoding = 3000,
    /// Signed message could not be encoded
    Serialization = 3001,
    /// Payload opcode not recognised
    UnknownOpcode = 3002,
    /// Local validation failed
    InvalidData = 4000,
    /// Node could not be reached
    Transport = 5000,
    /// Node rejected the request
    Remote = 5001,
}

/// Error type for offline signing and session dispatch.
#[derive(thiserror::Error, Debug)]
pub enum OffsignError {
    /// Offline signing was requested but no private key is configured.
    #[error("private key not available in configuration file or environment variable")]
    MissingKey,

    /// The private-key representation could not be parsed into a usable key.
    #[error("invalid private key: {0}")]
    KeyDecoding(String),

    /// The public key could not be extracted from the key material.
    #[error("public key derivation failed: {0}")]
    KeyDerivation(String),

    /// The underlying signing operation did not complete.
    #[error("signing failed: {0}")]
    Signing(String),

    /// An unsigned payload or response did not have the expected shape.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A signed message could not be encoded for transmission.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The payload's opcode names no known message builder.
    #[error("unknown signing opcode: {0:?}")]
    UnknownOpcode(String),

    /// Invalid input caught before anything was signed or sent.
    #[error("invalid {field}: {reason}")]
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The dispatcher could not complete the round-trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with an error, passed through verbatim.
    #[error("{operation} failed: {message}")]
    Remote {
        /// Operation name that was dispatched
        operation: String,
        /// Message returned by the node
        message: String,
    },
}

impl OffsignError {
    /// Get the error code for FFI/CLI integration.
    pub fn code(&self) -> OffsignErrorCode {
        match self {
            Self::MissingKey => OffsignErrorCode::MissingKey,
            Self::KeyDecoding(_) => OffsignErrorCode::KeyDecoding,
            Self::KeyDerivation(_) => OffsignErrorCode::KeyDerivation,
            Self::Signing(_) => OffsignErrorCode::Signing,
            Self::Decoding(_) => OffsignErrorCode::Decoding,
            Self::Serialization(_) => OffsignErrorCode::Serialization,
            Self::UnknownOpcode(_) => OffsignErrorCode::UnknownOpcode,
            Self::InvalidData { .. } => OffsignErrorCode::InvalidData,
            Self::Transport(_) => OffsignErrorCode::Transport,
            Self::Remote { .. } => OffsignErrorCode::Remote,
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    ///
    /// Signed artifacts embed session-specific values (such as the payer id),
    /// so only failures that happened before the node saw the request qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a remote error for the given operation.
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Wrap a JSON failure that happened while reading data from the node.
    pub fn decoding(context: &str, err: serde_json::Error) -> Self {
        Self::Decoding(format!("{}: {}", context, err))
    }

    /// Wrap a JSON failure that happened while encoding data for the node.
    pub fn serialization(context: &str, err: serde_json::Error) -> Self {
        Self::Serialization(format!("{}: {}", context, err))
    }
}

impl From<prost::DecodeError> for OffsignError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Decoding(err.to_string())
    }
}

impl From<prost::EncodeError> for OffsignError {
    fn from(err: prost::EncodeError) -> Self {
        Self::Serialization(err.to_string())
    }
}
