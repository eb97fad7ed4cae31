//! License tokens for Dukaan Pro.
//!
//! This crate handles:
//! - Issuing opaque license tokens for a customer and plan
//! - Validating tokens without a database lookup
//! - Plan-label driven expiry (months, years, days, trials)
//! - Offline grace on the consuming side
//!
//! # Token Format
//!
//! A token is `hex(nonce) || hex(ciphertext)`, the ChaCha20-Poly1305
//! encryption of a JSON entitlement record under a key derived from the
//! operator secret. Anyone holding the secret can issue and validate; nobody
//! else can do either.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dukaan_license::{IssueRequest, Issuer, LicenseConfig, ValidationOutcome, Validator};
//!
//! let config = LicenseConfig::from_env()?;
//! let key = config.derive_key();
//!
//! let issued = Issuer::new(key.clone())
//!     .issue_now(&IssueRequest::new("Asha Traders", "+91 98765 43210", "6 Month"))?;
//!
//! match Validator::new(key).classify_now(&issued.token) {
//!     ValidationOutcome::Valid { plan, .. } => println!("licensed: {plan}"),
//!     other => println!("denied: {}", other.message()),
//! }
//! # Ok::<(), dukaan_license::LicenseError>(())
//! ```

mod client;
mod config;
mod entitlement;
mod error;
mod expiry;
mod issuer;
mod outcome;
mod plans;
mod registry;
mod trust;
mod validator;

pub use client::{
    cached_access, AccessDecision, DenyReason, LicenseClient, LocalTransport, ValidationTransport,
};
pub use config::{LicenseConfig, SECRET_ENV_VAR};
pub use entitlement::{Entitlement, NONCE_TAG_BYTES};
pub use error::{LicenseError, LicenseResult};
pub use expiry::{
    compute_expiry, PlanLabel, PlanUnit, DEFAULT_QUANTITY, END_OF_DAY, LATEST_EXPIRY_DATE,
};
pub use issuer::{IssueRequest, IssuedLicense, Issuer};
pub use outcome::{MalformedReason, ValidationOutcome};
pub use plans::{catalog, find_plan, PlanOffer};
pub use registry::{
    next_serial_after, MemoryRegistry, RegisteredCustomer, RegistryEntry, SerialRegistry,
    SERIAL_PREFIX,
};
pub use trust::{
    default_trust_store_path, trust_store_override, FileTrustStore, MemoryTrustStore, TrustEntry,
    TrustStore, TRUST_STORE_ENV_VAR,
};
pub use validator::{is_trial_token, Validator, TRIAL_PREFIX};
