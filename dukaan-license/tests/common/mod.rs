//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use dukaan_crypto::{derive_secret_key, encrypt_token, DerivedKey};
use dukaan_license::{
    IssueRequest, IssuedLicense, Issuer, LicenseError, LicenseResult, RegistryEntry,
    SerialRegistry, TrustEntry, TrustStore, ValidationOutcome, ValidationTransport, Validator,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Secret used by the issuing side in tests.
pub const TEST_SECRET: &str = "CHANGE_ME_SECRET_123!";

/// Returns the key derived from [`TEST_SECRET`].
pub fn test_key() -> Arc<DerivedKey> {
    Arc::new(derive_secret_key(TEST_SECRET))
}

/// Returns a key derived from some other secret.
pub fn other_key() -> Arc<DerivedKey> {
    Arc::new(derive_secret_key("a-completely-different-secret"))
}

/// UTC instant from calendar components.
pub fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
}

/// 23:59:59.999 UTC on the given day.
pub fn end_of(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    at(y, m, d, 23, 59, 59) + TimeDelta::milliseconds(999)
}

/// A standard request for `plan`.
pub fn request(plan: &str) -> IssueRequest {
    IssueRequest::new("Asha Traders", "+91 98765 43210", plan)
}

/// Issues a token for `plan` at `now` with the test key.
pub fn issue_at(plan: &str, now: DateTime<Utc>) -> IssuedLicense {
    Issuer::new(test_key()).issue(&request(plan), &now).unwrap()
}

/// Encrypts arbitrary bytes as a token under the test key.
pub fn token_for_payload(payload: &[u8]) -> String {
    encrypt_token(&test_key(), payload).unwrap()
}

/// Transport backed by a real validator with a controllable clock and an
/// on/off network switch.
pub struct ClockedTransport {
    validator: Validator,
    now: Mutex<DateTime<Utc>>,
    online: AtomicBool,
    calls: AtomicUsize,
}

impl ClockedTransport {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            validator: Validator::new(test_key()),
            now: Mutex::new(now),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ValidationTransport for &ClockedTransport {
    fn validate(&self, token: &str) -> LicenseResult<ValidationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.online.load(Ordering::SeqCst) {
            return Err(LicenseError::TransportUnavailable(
                "connection refused".to_string(),
            ));
        }
        let now = *self.now.lock().unwrap();
        Ok(self.validator.classify(token, &now))
    }
}

/// Registry that always fails.
pub struct BrokenRegistry;

impl SerialRegistry for BrokenRegistry {
    fn register(&self, _entry: RegistryEntry) -> LicenseResult<String> {
        Err(LicenseError::Registry("spreadsheet unavailable".to_string()))
    }
}

/// Trust store whose reads and writes always fail.
pub struct BrokenTrustStore;

impl TrustStore for BrokenTrustStore {
    fn get(&self) -> LicenseResult<Option<TrustEntry>> {
        Err(LicenseError::Storage("quota exceeded".to_string()))
    }

    fn set(&self, _entry: &TrustEntry) -> LicenseResult<()> {
        Err(LicenseError::Storage("quota exceeded".to_string()))
    }

    fn clear(&self) -> LicenseResult<()> {
        Err(LicenseError::Storage("quota exceeded".to_string()))
    }
}
