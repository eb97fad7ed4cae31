//! Consumer-side license checks with offline grace.
//!
//! The client asks a [`ValidationTransport`] to classify the token and keeps
//! the last accepted token in a [`TrustStore`]:
//!
//! - a live `Valid` stores `{token, verified: true}`
//! - a live `Expired` or `Malformed` clears the store
//! - a transport failure falls back to the stored entry, if verified
//!
//! A token the service has rejected can therefore never ride on offline
//! grace afterwards.

use crate::error::LicenseResult;
use crate::outcome::{MalformedReason, ValidationOutcome};
use crate::trust::{TrustEntry, TrustStore};
use crate::validator::Validator;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Round-trip to the validation service.
///
/// Implementations return `Ok` with the service's classification, and `Err`
/// only when the round-trip itself could not complete. Every `Err` is
/// treated as the service being unreachable.
pub trait ValidationTransport: Send + Sync {
    fn validate(&self, token: &str) -> LicenseResult<ValidationOutcome>;
}

/// Transport that classifies in-process with a local [`Validator`].
#[derive(Debug, Clone)]
pub struct LocalTransport {
    validator: Validator,
}

impl LocalTransport {
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }
}

impl ValidationTransport for LocalTransport {
    fn validate(&self, token: &str) -> LicenseResult<ValidationOutcome> {
        Ok(self.validator.classify_now(token))
    }
}

/// Why access was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No token was entered.
    MissingToken,
    /// The service reported the license as expired.
    Expired { expires_at: DateTime<Utc> },
    /// The service rejected the token.
    Malformed { reason: MalformedReason },
    /// The service was unreachable and nothing verified was cached.
    Unauthenticated,
}

/// Whether the protected feature set is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Live validation succeeded.
    Granted {
        plan: String,
        holder_name: String,
        expires_at: DateTime<Utc>,
    },
    /// Live validation accepted a trial pseudo-token.
    TrialAccess { expires_at: DateTime<Utc> },
    /// Service unreachable; a previously verified token is cached.
    OfflineGrace,
    /// Access refused.
    Denied { reason: DenyReason },
}

impl AccessDecision {
    /// Returns true if the protected feature set is available.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        !matches!(self, Self::Denied { .. })
    }
}

/// License checks for an application instance.
pub struct LicenseClient<T, S> {
    transport: T,
    store: S,
}

impl<T: ValidationTransport, S: TrustStore> LicenseClient<T, S> {
    pub fn new(transport: T, store: S) -> Self {
        Self { transport, store }
    }

    /// Returns the trust store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates `token` with the service and updates the trust cache.
    pub fn check(&self, token: &str) -> AccessDecision {
        let token = token.trim();
        if token.is_empty() {
            return AccessDecision::Denied {
                reason: DenyReason::MissingToken,
            };
        }

        match self.transport.validate(token) {
            Ok(outcome) => self.apply_live(token, outcome),
            Err(e) => {
                warn!(error = %e, "license check could not reach the validation service");
                self.cached_grace()
            }
        }
    }

    /// Startup path: grants offline grace from the cache without a
    /// round-trip.
    pub fn resume(&self) -> AccessDecision {
        self.cached_grace()
    }

    fn apply_live(&self, token: &str, outcome: ValidationOutcome) -> AccessDecision {
        match outcome {
            ValidationOutcome::Valid {
                plan,
                holder_name,
                expires_at,
                ..
            } => {
                if let Err(e) = self.store.set(&TrustEntry::verified(token)) {
                    warn!(error = %e, "failed to cache verified license");
                }
                AccessDecision::Granted {
                    plan,
                    holder_name,
                    expires_at,
                }
            }
            ValidationOutcome::Trial { expires_at } => AccessDecision::TrialAccess { expires_at },
            ValidationOutcome::Expired { expires_at } => {
                self.forget();
                AccessDecision::Denied {
                    reason: DenyReason::Expired { expires_at },
                }
            }
            ValidationOutcome::Malformed { reason } => {
                self.forget();
                AccessDecision::Denied {
                    reason: DenyReason::Malformed { reason },
                }
            }
        }
    }

    fn cached_grace(&self) -> AccessDecision {
        cached_access(&self.store)
    }

    fn forget(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear rejected license from cache");
        }
    }
}

/// Decides access from the trust cache alone. Needs no key and makes no
/// round-trip.
pub fn cached_access<S: TrustStore + ?Sized>(store: &S) -> AccessDecision {
    match store.get() {
        Ok(Some(entry)) if entry.is_trusted() => {
            info!("offline: cached license active");
            AccessDecision::OfflineGrace
        }
        Ok(_) => {
            debug!("no verified license cached");
            AccessDecision::Denied {
                reason: DenyReason::Unauthenticated,
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to read license cache");
            AccessDecision::Denied {
                reason: DenyReason::Unauthenticated,
            }
        }
    }
}
