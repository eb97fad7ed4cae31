//! Service configuration.
//!
//! The secret is the root of trust for every token, so it has no built-in
//! fallback: a missing or blank `APP_SECRET_KEY` is a startup error.

use crate::error::{LicenseError, LicenseResult};
use crate::trust::{default_trust_store_path, trust_store_override, FileTrustStore};
use dukaan_crypto::{derive_secret_key, DerivedKey};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable holding the operator secret.
pub const SECRET_ENV_VAR: &str = "APP_SECRET_KEY";

/// Settings shared by the issuer, the validator and the client cache.
#[derive(Clone)]
pub struct LicenseConfig {
    secret: String,
    trust_store_path: Option<PathBuf>,
}

impl LicenseConfig {
    /// Creates a configuration from an explicit secret.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Config`] if the secret is blank.
    pub fn new(secret: impl Into<String>) -> LicenseResult<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(LicenseError::Config(format!("{SECRET_ENV_VAR} must not be empty")));
        }
        Ok(Self {
            secret,
            trust_store_path: None,
        })
    }

    /// Loads the configuration from the process environment.
    pub fn from_env() -> LicenseResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LicenseResult<Self> {
        let secret = lookup(SECRET_ENV_VAR)
            .ok_or_else(|| LicenseError::Config(format!("{SECRET_ENV_VAR} is not set")))?;
        let mut config = Self::new(secret)?;
        config.trust_store_path = trust_store_override(&lookup);
        Ok(config)
    }

    /// Overrides the trust store location.
    #[must_use]
    pub fn with_trust_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trust_store_path = Some(path.into());
        self
    }

    /// Derives the token key. Call once at startup and share the result.
    pub fn derive_key(&self) -> Arc<DerivedKey> {
        Arc::new(derive_secret_key(&self.secret))
    }

    /// Returns the configured trust store path, if overridden.
    pub fn trust_store_path(&self) -> Option<&Path> {
        self.trust_store_path.as_deref()
    }

    /// Opens the file trust store at the configured or default location.
    pub fn trust_store(&self) -> FileTrustStore {
        FileTrustStore::new(
            self.trust_store_path
                .clone()
                .unwrap_or_else(default_trust_store_path),
        )
    }
}

impl std::fmt::Debug for LicenseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseConfig")
            .field("secret", &"[REDACTED]")
            .field("trust_store_path", &self.trust_store_path)
            .finish()
    }
}
