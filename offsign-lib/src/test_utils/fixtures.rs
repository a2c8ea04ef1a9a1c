//! Fixed key material and key providers for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::crypto::{decode_public_key, Ed25519Signer, Signer};
use crate::keys::{KeyProvider, StaticKeyProvider};
use crate::Result;

/// Ed25519 seed from RFC 8032 Section 7.1, test 2.
pub const TEST_PRIVATE_KEY: &str =
    "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb";

/// Public key matching [`TEST_PRIVATE_KEY`].
pub const TEST_PUBLIC_KEY: &str =
    "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c";

pub const TEST_PEER_ID: &str = "peer-A";

/// Provider holding the test key pair under [`TEST_PEER_ID`].
pub fn test_keys() -> StaticKeyProvider {
    StaticKeyProvider::new(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY, TEST_PEER_ID)
}

/// Signer for [`TEST_PRIVATE_KEY`].
pub fn test_signer() -> Ed25519Signer {
    Ed25519Signer::from_private_key(TEST_PRIVATE_KEY).expect("test key is valid")
}

/// Raw bytes of [`TEST_PUBLIC_KEY`].
pub fn test_public_key_raw() -> Vec<u8> {
    decode_public_key(TEST_PUBLIC_KEY).expect("test public key is valid")
}

/// Key provider that counts how often a signer is loaded.
pub struct CountingKeyProvider {
    inner: StaticKeyProvider,
    loads: AtomicUsize,
}

impl CountingKeyProvider {
    pub fn new(inner: StaticKeyProvider) -> Self {
        Self {
            inner,
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of `load_signer` calls so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl KeyProvider for CountingKeyProvider {
    fn private_key(&self) -> String {
        self.inner.private_key()
    }

    fn public_key(&self) -> String {
        self.inner.public_key()
    }

    fn peer_id(&self) -> String {
        self.inner.peer_id()
    }

    fn load_signer(&self, private_key: &str) -> Result<Box<dyn Signer>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load_signer(private_key)
    }
}
