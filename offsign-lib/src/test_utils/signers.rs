//! Signers with scripted failures.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::fixtures::test_signer;
use crate::crypto::{Ed25519Signer, Signer};
use crate::{OffsignError, Result};

/// Signer that succeeds a fixed number of times, then fails.
pub struct FailingSigner {
    inner: Option<Ed25519Signer>,
    succeed: usize,
    calls: AtomicUsize,
}

impl FailingSigner {
    /// Fails every call, including public key derivation.
    pub fn new() -> Self {
        Self {
            inner: None,
            succeed: 0,
            calls: AtomicUsize::new(0),
        }
    }

    /// Signs `n` payloads with the test key, then fails.
    pub fn after(n: usize) -> Self {
        Self {
            inner: Some(test_signer()),
            succeed: n,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `sign` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer for FailingSigner {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(inner) if call < self.succeed => inner.sign(payload),
            _ => Err(OffsignError::Signing(format!(
                "scripted failure on call {}",
                call + 1
            ))),
        }
    }

    fn public_key_raw(&self) -> Result<Vec<u8>> {
        match &self.inner {
            Some(inner) => inner.public_key_raw(),
            None => Err(OffsignError::KeyDerivation("no public key".into())),
        }
    }
}
