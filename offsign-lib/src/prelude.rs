//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use offsign_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Client: `UploadSessionClient`, `ClientConfig`, `UploadOption`
//! - Seams: `Dispatcher`, `KeyProvider`, `Signer`
//! - Session data: `SessionStatus`, `ContractBatch`, `UnsignedPayload`, `Opcode`
//! - Error types: `OffsignError`, `OffsignErrorCode`, `Result`

// Client
pub use crate::client::UploadSessionClient;
pub use crate::config::ClientConfig;
pub use crate::dispatch::UploadOption;

// Seams
pub use crate::crypto::Signer;
pub use crate::dispatch::Dispatcher;
pub use crate::keys::{KeyProvider, StaticKeyProvider};

// Session data
pub use crate::builders::SignedArtifact;
pub use crate::session::upload_timestamp;
pub use crate::types::{ContractBatch, ContractItem, Opcode, SessionStatus, UnsignedPayload};

// Error handling
pub use crate::errors::{OffsignError, OffsignErrorCode};
pub use crate::Result;
