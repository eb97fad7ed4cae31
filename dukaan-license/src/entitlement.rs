//! The entitlement record carried inside a license token.
//!
//! Records travel as compact JSON with the field names the issuing service
//! has always used (`name`, `contact`, `plan`, `generated`, `expiry`,
//! `rand`). Timestamps are RFC 3339 in UTC.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Bytes of random entropy in [`Entitlement::nonce_tag`].
pub const NONCE_TAG_BYTES: usize = 4;

/// The plaintext facts a license token stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Customer name.
    #[serde(rename = "name")]
    pub holder_name: String,
    /// Phone number, e-mail or any other contact handle.
    pub contact: String,
    /// Plan label, uppercased at issuance.
    pub plan: String,
    /// When the token was issued.
    #[serde(rename = "generated")]
    pub issued_at: DateTime<Utc>,
    /// Last instant the token is valid.
    #[serde(rename = "expiry")]
    pub expires_at: DateTime<Utc>,
    /// Random hex so two otherwise identical records never coincide.
    #[serde(rename = "rand")]
    pub nonce_tag: String,
}

impl Entitlement {
    /// Builds a record with a fresh nonce tag. The plan label is uppercased.
    pub fn new(
        holder_name: impl Into<String>,
        contact: impl Into<String>,
        plan: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let mut tag = [0u8; NONCE_TAG_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut tag);

        Self {
            holder_name: holder_name.into(),
            contact: contact.into(),
            plan: plan.to_uppercase(),
            issued_at,
            expires_at,
            nonce_tag: hex::encode(tag),
        }
    }

    /// Serializes the record. Field order is fixed, so equal records encode
    /// to equal bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Serialization`] if the record cannot be
    /// written as JSON.
    pub fn encode(&self) -> LicenseResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses a record, rejecting anything that is not a complete, coherent
    /// entitlement.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidPayload`] for truncated, non-JSON,
    /// mistyped or incomplete input, and for records whose expiry does not
    /// come after their issue time.
    pub fn decode(bytes: &[u8]) -> LicenseResult<Self> {
        let record: Self = serde_json::from_slice(bytes)
            .map_err(|e| LicenseError::InvalidPayload(format!("invalid payload JSON: {e}")))?;

        if record.expires_at <= record.issued_at {
            return Err(LicenseError::InvalidPayload(
                "expiry must be after issue time".to_string(),
            ));
        }

        Ok(record)
    }

    /// Returns true if the record has lapsed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Entitlement {
        Entitlement::new(
            "Asha Traders",
            "+91 98765 43210",
            "1 Month",
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 15, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn plan_is_uppercased() {
        assert_eq!(sample().plan, "1 MONTH");
    }

    #[test]
    fn nonce_tag_is_hex() {
        let tag = sample().nonce_tag;
        assert_eq!(tag.len(), 2 * NONCE_TAG_BYTES);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn wire_field_names() {
        let value: serde_json::Value = serde_json::from_slice(&sample().encode().unwrap()).unwrap();
        for field in ["name", "contact", "plan", "generated", "expiry", "rand"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let record = sample();
        assert_eq!(record.encode().unwrap(), record.clone().encode().unwrap());
    }
}
