//! Token encryption using ChaCha20-Poly1305.
//!
//! A token is the hex encoding of `nonce || ciphertext`, where the
//! ciphertext carries the Poly1305 tag. Any flipped bit, truncation or key
//! mismatch fails tag verification instead of yielding altered plaintext.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Shortest well-formed token, in hex characters: nonce plus a bare tag.
pub const MIN_TOKEN_LEN: usize = 2 * (NONCE_SIZE + TAG_SIZE);

/// Encrypted data with metadata needed for decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Returns the total size of the encrypted data.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Encodes to the printable token form.
    pub fn to_hex(&self) -> String {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        hex::encode(bytes)
    }

    /// Decodes from the printable token form.
    ///
    /// The length guard runs before anything is sliced, so short or garbage
    /// input is an error, never a panic. Uppercase hex is rejected.
    pub fn from_hex(token: &str) -> CryptoResult<Self> {
        if token.len() < MIN_TOKEN_LEN {
            return Err(CryptoError::Decryption(format!(
                "token too short: {} < {MIN_TOKEN_LEN} characters",
                token.len()
            )));
        }

        // Only the canonical lowercase form is a token. Uppercase digits
        // decode to the same bytes and would let a changed token authenticate.
        if let Some(pos) = token.bytes().position(|b| !matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CryptoError::Decryption(format!(
                "invalid token character at position {pos}"
            )));
        }

        let bytes = hex::decode(token)
            .map_err(|e| CryptoError::Decryption(format!("invalid hex: {e}")))?;

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = bytes[NONCE_SIZE..].to_vec();

        Ok(Self { nonce, ciphertext })
    }
}

/// Encrypts plaintext under a fresh random nonce.
pub fn encrypt(key: &DerivedKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedData {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts and authenticates ciphertext.
pub fn decrypt(key: &DerivedKey, encrypted: &EncryptedData) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&encrypted.nonce);

    cipher
        .decrypt(nonce, encrypted.ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::Decryption("decryption failed (wrong key or tampered data)".to_string())
        })
}

/// Encrypts a payload straight into token form.
pub fn encrypt_token(key: &DerivedKey, payload: &[u8]) -> CryptoResult<String> {
    let encrypted = encrypt(key, payload)?;
    Ok(encrypted.to_hex())
}

/// Recovers the payload from a token.
pub fn decrypt_token(key: &DerivedKey, token: &str) -> CryptoResult<Vec<u8>> {
    let encrypted = EncryptedData::from_hex(token)?;
    decrypt(key, &encrypted)
}
