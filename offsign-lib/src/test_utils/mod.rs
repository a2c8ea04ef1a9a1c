//! Test utilities for the offline-signing client.
//!
//! This module provides:
//! - A scripted, recording [`MockDispatcher`]
//! - Signers that fail on demand
//! - Fixed key fixtures and a key provider that counts signer loads
//!
//! ## Usage
//!
//! ```rust,ignore
//! use offsign_lib::test_utils::{test_keys, MockDispatcher};
//! use offsign_lib::UploadSessionClient;
//!
//! let dispatcher = MockDispatcher::new();
//! dispatcher.respond_json("storage/upload", serde_json::json!({"ID": "sid"}));
//!
//! let client = UploadSessionClient::new(dispatcher, test_keys());
//! let sid = client.start_upload("Qm123").await?;
//! assert_eq!(client.dispatcher().requests().len(), 1);
//! ```

mod fixtures;
mod mock_dispatcher;
mod signers;

pub use fixtures::{
    test_keys, test_public_key_raw, test_signer, CountingKeyProvider, TEST_PEER_ID,
    TEST_PRIVATE_KEY, TEST_PUBLIC_KEY,
};
pub use mock_dispatcher::MockDispatcher;
pub use signers::FailingSigner;
