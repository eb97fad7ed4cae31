//! Customer serial bookkeeping.
//!
//! The issuer records each license with a registry and gets back a
//! `CUST-NNNN` serial. The registry owns serial allocation and must make
//! allocate-and-append atomic. Token validity never depends on it.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Prefix of customer serial numbers.
pub const SERIAL_PREFIX: &str = "CUST-";

/// Minimum digit width of a serial number.
const SERIAL_WIDTH: usize = 4;

/// One issued license as the registry stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub token: String,
    pub holder_name: String,
    pub address: Option<String>,
    pub contact: String,
    pub plan: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A registry entry with its allocated serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCustomer {
    pub serial: String,
    #[serde(flatten)]
    pub entry: RegistryEntry,
}

/// Collaborator that allocates serials and persists issued licenses.
pub trait SerialRegistry: Send + Sync {
    /// Records `entry` and returns the serial assigned to it.
    fn register(&self, entry: RegistryEntry) -> LicenseResult<String>;
}

/// Returns the serial following `last`.
///
/// The trailing number of the last `CUST-` serial is incremented and
/// zero-padded. Without a usable predecessor the sequence starts at
/// `CUST-0001`.
#[must_use]
pub fn next_serial_after(last: Option<&str>) -> String {
    let last_number = last
        .and_then(|serial| serial.strip_prefix(SERIAL_PREFIX))
        .map(trailing_number)
        .unwrap_or(0);

    format!(
        "{SERIAL_PREFIX}{:0width$}",
        last_number.saturating_add(1),
        width = SERIAL_WIDTH
    )
}

fn trailing_number(text: &str) -> u64 {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map_or(text.len(), |(i, _)| i);

    text[start..].parse().unwrap_or(0)
}

/// In-process registry. Allocation and append happen under one lock.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    customers: Mutex<Vec<RegisteredCustomer>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every registered customer, oldest first.
    pub fn customers(&self) -> LicenseResult<Vec<RegisteredCustomer>> {
        let customers = self
            .customers
            .lock()
            .map_err(|_| LicenseError::Registry("registry lock poisoned".to_string()))?;
        Ok(customers.clone())
    }
}

impl SerialRegistry for MemoryRegistry {
    fn register(&self, entry: RegistryEntry) -> LicenseResult<String> {
        let mut customers = self
            .customers
            .lock()
            .map_err(|_| LicenseError::Registry("registry lock poisoned".to_string()))?;

        let last = customers
            .iter()
            .rev()
            .find(|c| c.serial.starts_with(SERIAL_PREFIX))
            .map(|c| c.serial.as_str());
        let serial = next_serial_after(last);

        customers.push(RegisteredCustomer {
            serial: serial.clone(),
            entry,
        });
        Ok(serial)
    }
}
