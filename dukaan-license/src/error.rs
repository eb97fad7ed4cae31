//! Error types for the licensing module.

use dukaan_crypto::CryptoError;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A required issuance field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Payload is not a well-formed entitlement record.
    #[error("invalid license payload: {0}")]
    InvalidPayload(String),

    /// Token could not be encrypted or decrypted.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// License has expired.
    #[error("license expired on {0}")]
    Expired(String),

    /// The validation service could not be reached.
    #[error("validation service unavailable: {0}")]
    TransportUnavailable(String),

    /// Serial registry failure.
    #[error("registry error: {0}")]
    Registry(String),

    /// Trust store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
