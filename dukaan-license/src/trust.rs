//! Consumer-side storage for the last verified token.
//!
//! An entry is only trusted when its `verified` flag is set. Entries
//! written by older clients without the flag deserialize as unverified.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Environment variable overriding the trust store location.
pub const TRUST_STORE_ENV_VAR: &str = "DUKAAN_TRUST_STORE";

/// The cached result of a successful live validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustEntry {
    pub token: String,
    #[serde(default)]
    pub verified: bool,
}

impl TrustEntry {
    /// An entry for a token the service just accepted.
    pub fn verified(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            verified: true,
        }
    }

    /// Returns true if the entry may back offline grace.
    #[must_use]
    pub fn is_trusted(&self) -> bool {
        self.verified && !self.token.trim().is_empty()
    }
}

/// Key-value surface behind the client trust cache.
pub trait TrustStore: Send + Sync {
    /// Returns the stored entry, if any.
    fn get(&self) -> LicenseResult<Option<TrustEntry>>;

    /// Replaces the stored entry.
    fn set(&self, entry: &TrustEntry) -> LicenseResult<()>;

    /// Removes the stored entry. Clearing an empty store is not an error.
    fn clear(&self) -> LicenseResult<()>;
}

/// Trust store held in memory.
#[derive(Debug, Default)]
pub struct MemoryTrustStore {
    entry: Mutex<Option<TrustEntry>>,
}

impl MemoryTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `entry`.
    pub fn with_entry(entry: TrustEntry) -> Self {
        Self {
            entry: Mutex::new(Some(entry)),
        }
    }

    fn slot(&self) -> LicenseResult<std::sync::MutexGuard<'_, Option<TrustEntry>>> {
        self.entry
            .lock()
            .map_err(|_| LicenseError::Storage("trust store lock poisoned".to_string()))
    }
}

impl TrustStore for MemoryTrustStore {
    fn get(&self) -> LicenseResult<Option<TrustEntry>> {
        Ok(self.slot()?.clone())
    }

    fn set(&self, entry: &TrustEntry) -> LicenseResult<()> {
        *self.slot()? = Some(entry.clone());
        Ok(())
    }

    fn clear(&self) -> LicenseResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Trust store persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileTrustStore {
    path: PathBuf,
}

impl FileTrustStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.dukaan/license.json`.
    pub fn at_default_path() -> Self {
        Self::new(default_trust_store_path())
    }

    /// Store at the `DUKAAN_TRUST_STORE` override found through `lookup`,
    /// else at the default path.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(trust_store_override(lookup).unwrap_or_else(default_trust_store_path))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrustStore for FileTrustStore {
    fn get(&self) -> LicenseResult<Option<TrustEntry>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set(&self, entry: &TrustEntry) -> LicenseResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entry)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> LicenseResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Default trust store path.
pub fn default_trust_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dukaan")
        .join("license.json")
}

/// Reads the trust store override through `lookup`. Blank values are ignored.
pub fn trust_store_override(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    lookup(TRUST_STORE_ENV_VAR)
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}
