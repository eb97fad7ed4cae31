//! Key derivation and management.
//!
//! The operator secret is hashed with SHA-256 into the symmetric key used by
//! the token cipher. The same secret yields the same key in every process and
//! on every replica, so no key distribution step is needed.

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// A derived encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a key from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self { bytes })
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derives the token key from an operator secret.
///
/// One-way and deterministic. There is no error path: every string,
/// including the empty one, maps to a key. Rejecting empty secrets is the
/// job of the configuration layer.
pub fn derive_secret_key(secret: &str) -> DerivedKey {
    let digest = Sha256::digest(secret.as_bytes());
    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&digest);
    DerivedKey::from_bytes(bytes)
}

/// Generates a random encryption key.
pub fn generate_random_key() -> DerivedKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    DerivedKey::from_bytes(bytes)
}
