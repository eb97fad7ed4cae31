//! Token validation.
//!
//! Classification runs in a fixed order and the first match wins:
//!
//! 1. `TRIAL...` pseudo-tokens → [`ValidationOutcome::Trial`] (no crypto)
//! 2. Decryption failure → `Malformed` (secret mismatch)
//! 3. Payload is not an entitlement → `Malformed` (unparseable payload)
//! 4. `now` past the expiry → `Expired`, otherwise `Valid`
//!
//! Every failure is folded into an outcome. Nothing from the cipher or the
//! JSON parser escapes `classify`.

use crate::entitlement::Entitlement;
use crate::expiry::compute_expiry;
use crate::outcome::{MalformedReason, ValidationOutcome};
use chrono::{DateTime, Local, TimeZone, Utc};
use dukaan_crypto::{decrypt_token, DerivedKey};
use std::sync::Arc;
use tracing::debug;

/// Prefix of trial pseudo-tokens (case-insensitive).
pub const TRIAL_PREFIX: &str = "TRIAL";

/// Returns true if `token` is a trial pseudo-token.
#[must_use]
pub fn is_trial_token(token: &str) -> bool {
    token
        .trim()
        .get(..TRIAL_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(TRIAL_PREFIX))
}

/// Stateless token classifier bound to one derived key.
#[derive(Debug, Clone)]
pub struct Validator {
    key: Arc<DerivedKey>,
}

impl Validator {
    /// Creates a validator using the shared service key.
    pub fn new(key: Arc<DerivedKey>) -> Self {
        Self { key }
    }

    /// Classifies `token` as of `now`.
    ///
    /// For trial pseudo-tokens the whole label goes through the expiry
    /// policy, so `"TRIAL"` lasts one day and `"TRIAL 7"` seven. The trial
    /// expiry is informational only and is not compared with `now`.
    pub fn classify<Tz: TimeZone>(&self, token: &str, now: &DateTime<Tz>) -> ValidationOutcome {
        let token = token.trim();

        if is_trial_token(token) {
            let expires_at = compute_expiry(token, now).with_timezone(&Utc);
            debug!(%expires_at, "trial token accepted");
            return ValidationOutcome::Trial { expires_at };
        }

        let payload = match decrypt_token(&self.key, token) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, token_len = token.len(), "token rejected");
                return ValidationOutcome::Malformed {
                    reason: MalformedReason::SecretMismatch,
                };
            }
        };

        let record = match Entitlement::decode(&payload) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "token payload rejected");
                return ValidationOutcome::Malformed {
                    reason: MalformedReason::UnparseablePayload,
                };
            }
        };

        if record.is_expired_at(now.with_timezone(&Utc)) {
            debug!(expires_at = %record.expires_at, "token expired");
            return ValidationOutcome::Expired {
                expires_at: record.expires_at,
            };
        }

        ValidationOutcome::Valid {
            plan: record.plan,
            holder_name: record.holder_name,
            contact: record.contact,
            expires_at: record.expires_at,
        }
    }

    /// Classifies `token` against the local clock.
    pub fn classify_now(&self, token: &str) -> ValidationOutcome {
        self.classify(token, &Local::now())
    }
}
