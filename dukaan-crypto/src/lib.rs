//! Cryptography for Dukaan license tokens.
//!
//! - Operator secret → 256-bit key (SHA-256)
//! - Payload ↔ opaque hex token (ChaCha20-Poly1305, random 96-bit nonce)
//!
//! Keys are immutable once derived and can be shared between threads
//! behind an `Arc`.

mod cipher;
mod error;
mod key;

pub use cipher::{
    decrypt, decrypt_token, encrypt, encrypt_token, EncryptedData, MIN_TOKEN_LEN, NONCE_SIZE,
    TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_secret_key, generate_random_key, DerivedKey, KEY_SIZE};
