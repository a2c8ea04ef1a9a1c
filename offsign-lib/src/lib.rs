//! Offline signing client for storage-contract upload sessions.
//!
//! A node running in offline-sign mode negotiates storage contracts on the
//! caller's behalf but never holds the caller's private key. Whenever the
//! session needs a signature it hands the unsigned material back; this crate
//! fetches that material, produces the signed artifact locally, and submits
//! it tagged with the session identity.
//!
//! The crate holds no session state. Key material is injected through
//! [`KeyProvider`] and every round-trip goes through [`Dispatcher`], so the
//! transport is the caller's choice.
//!
//! # Features
//!
//! - **Message builders**: raw data signatures, balance attestations,
//!   payment-channel commitments, escrow payin requests
//! - **Contract batches**: all-or-nothing signing of host contracts
//! - **Session client**: start, poll, fetch and submit over any dispatcher
//! - `http-dispatcher`: a reqwest-backed [`dispatch::HttpDispatcher`]
//! - `tracing`: spans and events on client operations
//!
//! # Example
//!
//! ```ignore
//! use offsign_lib::{config_from_env, key_provider_from_env, upload_timestamp, UploadSessionClient};
//! use offsign_lib::dispatch::HttpDispatcher;
//!
//! let config = config_from_env();
//! let client = UploadSessionClient::with_config(
//!     HttpDispatcher::new(&config)?,
//!     key_provider_from_env()?,
//!     config,
//! );
//! let sid = client.start_upload_offline("Qm...", &upload_timestamp(), &[]).await?;
//! ```

pub mod builders;
pub mod client;
pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod errors;
pub mod keys;
pub mod messages;
pub mod prelude;
pub mod session;
pub mod types;

/// Test utilities: mock dispatcher, failing signers and key fixtures.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builders::SignedArtifact;
pub use client::UploadSessionClient;
pub use config::{config_from_env, key_provider_from_env, ClientConfig};
pub use crypto::{Ed25519Signer, Signer};
pub use dispatch::{Dispatcher, SessionRequest, UploadOption};
pub use errors::{OffsignError, OffsignErrorCode};
pub use keys::{generate_keypair, KeyProvider, StaticKeyProvider};
pub use session::{derive_session_tag, upload_timestamp, PayerIdSource, SessionTag};
pub use types::{
    ContractBatch, ContractItem, Opcode, SessionStatus, Shard, UnsignedPayload, UploadResponse,
};

/// Common result alias for offline signing operations.
pub type Result<T> = std::result::Result<T, OffsignError>;
