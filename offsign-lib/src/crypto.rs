//! # Signature Primitives
//!
//! Ed25519 detached signatures over raw bytes or over the protobuf encoding of
//! a structured message.
//!
//! Private keys travel as hex strings: either the 32-byte seed, or the 64-byte
//! `seed || public` keypair encoding. Signatures are raw 64-byte values and
//! should be treated as opaque by callers.

use ed25519_dalek::{Signature as DalekSig, Signer as _, SigningKey, Verifier, VerifyingKey};
use prost::Message;
use zeroize::{Zeroize, Zeroizing};

use crate::{OffsignError, Result};

/// Capability to produce detached signatures with a private key.
///
/// The upload session client only ever signs through this trait, so tests and
/// hardware-backed keys can stand in for [`Ed25519Signer`].
pub trait Signer: Send + Sync {
    /// Sign an arbitrary byte payload.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Raw encoding of the public key matching this signer.
    fn public_key_raw(&self) -> Result<Vec<u8>>;
}

/// Sign the protobuf encoding of `message`.
///
/// The signature covers the structure itself, not any envelope it is later
/// wrapped in.
pub fn sign_message<S, M>(signer: &S, message: &M) -> Result<Vec<u8>>
where
    S: Signer + ?Sized,
    M: Message,
{
    signer.sign(&message.encode_to_vec())
}

/// Ed25519 signer backed by an in-memory seed.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Wrap an existing signing key.
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Parse a hex-encoded private key.
    ///
    /// Accepts a 32-byte seed or a 64-byte keypair whose trailing half must be
    /// the public key of the seed.
    pub fn from_private_key(encoded: &str) -> Result<Self> {
        let (mut seed, public) = decode_private_key(encoded.trim())?;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();

        if let Some(public) = public {
            if signing_key.verifying_key().as_bytes() != public.as_slice() {
                return Err(OffsignError::KeyDecoding(
                    "keypair public half does not match its seed".into(),
                ));
            }
        }

        Ok(Self { signing_key })
    }

    /// The Ed25519 verifying key for this signer.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Hex encoding of the 32-byte public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key().to_bytes())
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(payload).to_bytes().to_vec())
    }

    fn public_key_raw(&self) -> Result<Vec<u8>> {
        Ok(self.verifying_key().to_bytes().to_vec())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Verify a detached Ed25519 signature.
///
/// # Returns
///
/// `Ok(true)` if the signature is valid for `payload`
/// `Ok(false)` if it is not
/// `Err(_)` if the public key or signature bytes are malformed
pub fn verify_signature(public_key: &[u8], payload: &[u8], signature: &[u8]) -> Result<bool> {
    let key_bytes: [u8; 32] = public_key.try_into().map_err(|_| {
        OffsignError::KeyDecoding(format!(
            "public key must be 32 bytes, got {}",
            public_key.len()
        ))
    })?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| OffsignError::KeyDecoding(format!("invalid public key: {}", e)))?;

    let sig_bytes: [u8; 64] = signature.try_into().map_err(|_| {
        OffsignError::Decoding(format!(
            "signature must be 64 bytes, got {}",
            signature.len()
        ))
    })?;
    let sig = DalekSig::from_bytes(&sig_bytes);

    Ok(verifying_key.verify(payload, &sig).is_ok())
}

/// Verify a signature made with [`sign_message`].
pub fn verify_message<M: Message>(public_key: &[u8], message: &M, signature: &[u8]) -> Result<bool> {
    verify_signature(public_key, &message.encode_to_vec(), signature)
}

/// Decode a hex public key into its raw 32 bytes.
pub fn decode_public_key(encoded: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| OffsignError::KeyDecoding(format!("public key is not hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(OffsignError::KeyDecoding(format!(
            "public key must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Decode a hex private key into its seed and, for keypair encodings, the
/// public half. The decoded buffer is wiped on drop.
fn decode_private_key(encoded: &str) -> Result<([u8; 32], Option<Zeroizing<Vec<u8>>>)> {
    if encoded.is_empty() {
        return Err(OffsignError::KeyDecoding("private key is empty".into()));
    }
    let bytes = Zeroizing::new(
        hex::decode(encoded)
            .map_err(|e| OffsignError::KeyDecoding(format!("private key is not hex: {}", e)))?,
    );
    let public = match bytes.len() {
        32 => None,
        64 => Some(Zeroizing::new(bytes[32..].to_vec())),
        n => {
            return Err(OffsignError::KeyDecoding(format!(
                "private key must be 32 or 64 bytes, got {}",
                n
            )))
        }
    };
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);
    Ok((seed, public))
}
