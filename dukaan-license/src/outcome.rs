//! Classified results of validating a token.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a token was classified as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    /// Too short, not hex, tampered, or minted under another secret.
    SecretMismatch,
    /// Decrypted, but not an entitlement record.
    UnparseablePayload,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SecretMismatch => "invalid key or secret mismatch",
            Self::UnparseablePayload => "unparseable payload",
        };
        f.write_str(text)
    }
}

/// The outcome of validating one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationOutcome {
    /// Authentic and within its validity window.
    Valid {
        plan: String,
        holder_name: String,
        contact: String,
        expires_at: DateTime<Utc>,
    },
    /// Authentic but past its expiry instant.
    Expired { expires_at: DateTime<Utc> },
    /// Not a token this service issued.
    Malformed { reason: MalformedReason },
    /// A `TRIAL` pseudo-token. Never cryptographically backed.
    Trial { expires_at: DateTime<Utc> },
}

impl ValidationOutcome {
    /// Returns true if the outcome opens the protected feature set.
    #[must_use]
    pub fn grants_access(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Trial { .. })
    }

    /// Returns the expiry carried by the outcome, if any.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Valid { expires_at, .. }
            | Self::Expired { expires_at }
            | Self::Trial { expires_at } => Some(*expires_at),
            Self::Malformed { .. } => None,
        }
    }

    /// Human-readable status line, matching the service's response messages.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Valid { .. } => "Key valid".to_string(),
            Self::Expired { .. } => "License expired".to_string(),
            Self::Malformed { reason } => capitalize(&reason.to_string()),
            Self::Trial { .. } => "Trial valid".to_string(),
        }
    }

    /// Converts denials into errors, for callers that want `?`.
    ///
    /// # Errors
    ///
    /// `Expired` becomes [`LicenseError::Expired`]; `Malformed` becomes
    /// [`LicenseError::InvalidPayload`].
    pub fn into_result(self) -> LicenseResult<Self> {
        match self {
            Self::Expired { expires_at } => Err(LicenseError::Expired(expires_at.to_rfc3339())),
            Self::Malformed { reason } => Err(LicenseError::InvalidPayload(reason.to_string())),
            other => Ok(other),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
