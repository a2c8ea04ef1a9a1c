//! Key material for offline signing.
//!
//! The upload session client never reads keys from ambient state. A
//! [`KeyProvider`] is injected at construction and consulted on every signing
//! call, so several identities can coexist in one process and tests can supply
//! fixed fixtures.
//!
//! An empty private key is a valid configuration: it means offline signing is
//! unavailable, and every signing operation fails with
//! [`OffsignError::MissingKey`](crate::OffsignError::MissingKey).

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::crypto::{Ed25519Signer, Signer};
use crate::Result;

/// Read-only source of the caller's key material and peer identity.
pub trait KeyProvider: Send + Sync {
    /// Hex-encoded private key, or an empty string when none is configured.
    fn private_key(&self) -> String;

    /// Hex-encoded public key. May be empty, in which case the public key is
    /// derived from the private key when needed.
    fn public_key(&self) -> String;

    /// Peer identity of this node as known to the storage network.
    fn peer_id(&self) -> String;

    /// Turn a non-empty private key into a signing capability.
    fn load_signer(&self, private_key: &str) -> Result<Box<dyn Signer>> {
        Ok(Box::new(Ed25519Signer::from_private_key(private_key)?))
    }
}

impl<K: KeyProvider + ?Sized> KeyProvider for Arc<K> {
    fn private_key(&self) -> String {
        (**self).private_key()
    }

    fn public_key(&self) -> String {
        (**self).public_key()
    }

    fn peer_id(&self) -> String {
        (**self).peer_id()
    }

    fn load_signer(&self, private_key: &str) -> Result<Box<dyn Signer>> {
        (**self).load_signer(private_key)
    }
}

/// Fixed key material, typically loaded once from configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StaticKeyProvider {
    /// Hex-encoded private key. Empty disables offline signing. Never
    /// written out when the provider is serialized.
    #[serde(default, skip_serializing)]
    pub private_key: String,
    /// Hex-encoded public key.
    #[serde(default)]
    pub public_key: String,
    /// Peer identity.
    #[serde(default)]
    pub peer_id: String,
}

impl StaticKeyProvider {
    /// Create a provider from explicit values.
    pub fn new(
        private_key: impl Into<String>,
        public_key: impl Into<String>,
        peer_id: impl Into<String>,
    ) -> Self {
        Self {
            private_key: private_key.into(),
            public_key: public_key.into(),
            peer_id: peer_id.into(),
        }
    }

    /// Build a provider from a private key alone.
    ///
    /// The public key is derived from the seed and the peer id defaults to the
    /// hex public key.
    pub fn from_private_key(private_key: impl Into<String>) -> Result<Self> {
        let private_key = private_key.into();
        let public_key = Ed25519Signer::from_private_key(&private_key)?.public_key_hex();
        Ok(Self {
            private_key,
            peer_id: public_key.clone(),
            public_key,
        })
    }

    /// Provider with a peer id but no private key (offline signing disabled).
    pub fn without_private_key(peer_id: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            ..Self::default()
        }
    }

    /// Override the peer id.
    pub fn with_peer_id(mut self, peer_id: impl Into<String>) -> Self {
        self.peer_id = peer_id.into();
        self
    }

    /// Whether offline signing is possible with this provider.
    pub fn has_private_key(&self) -> bool {
        !self.private_key.trim().is_empty()
    }
}

impl KeyProvider for StaticKeyProvider {
    fn private_key(&self) -> String {
        self.private_key.clone()
    }

    fn public_key(&self) -> String {
        self.public_key.clone()
    }

    fn peer_id(&self) -> String {
        self.peer_id.clone()
    }
}

impl std::fmt::Debug for StaticKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeyProvider")
            .field("private_key", &if self.has_private_key() { "<redacted>" } else { "<none>" })
            .field("public_key", &self.public_key)
            .field("peer_id", &self.peer_id)
            .finish()
    }
}

/// Freshly generated Ed25519 key material, hex encoded.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeneratedKeypair {
    /// Secret key (seed) - 32 bytes, hex encoded.
    /// SENSITIVE: store securely.
    pub private_key: String,
    /// Public key - 32 bytes, hex encoded.
    pub public_key: String,
}

/// Generate a new random Ed25519 keypair.
pub fn generate_keypair() -> GeneratedKeypair {
    let signing_key = SigningKey::generate(&mut OsRng);
    GeneratedKeypair {
        private_key: hex::encode(signing_key.to_bytes()),
        public_key: hex::encode(signing_key.verifying_key().to_bytes()),
    }
}
