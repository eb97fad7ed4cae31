//! License issuance (admin path).

use crate::entitlement::Entitlement;
use crate::error::{LicenseError, LicenseResult};
use crate::expiry::compute_expiry;
use crate::registry::{RegistryEntry, SerialRegistry};
use chrono::{DateTime, Local, TimeZone, Utc};
use dukaan_crypto::{encrypt_token, DerivedKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// What the operator asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub holder_name: String,
    pub contact: String,
    pub plan: String,
    /// Postal address, kept in the registry only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl IssueRequest {
    pub fn new(
        holder_name: impl Into<String>,
        contact: impl Into<String>,
        plan: impl Into<String>,
    ) -> Self {
        Self {
            holder_name: holder_name.into(),
            contact: contact.into(),
            plan: plan.into(),
            address: None,
        }
    }

    /// Sets the postal address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    fn validate(&self) -> LicenseResult<()> {
        for (field, value) in [
            ("holder_name", &self.holder_name),
            ("contact", &self.contact),
            ("plan", &self.plan),
        ] {
            if value.trim().is_empty() {
                return Err(LicenseError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// A freshly minted license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedLicense {
    /// The opaque token to hand to the customer.
    pub token: String,
    /// Last valid instant.
    pub expires_at: DateTime<Utc>,
    /// Registry serial, if the registry accepted the record.
    pub serial: Option<String>,
}

/// Mints license tokens under the shared service key.
#[derive(Clone)]
pub struct Issuer {
    key: Arc<DerivedKey>,
    registry: Option<Arc<dyn SerialRegistry>>,
}

impl Issuer {
    /// Creates an issuer without registry bookkeeping.
    pub fn new(key: Arc<DerivedKey>) -> Self {
        Self {
            key,
            registry: None,
        }
    }

    /// Records every issued license with `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn SerialRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Issues a token for `request` as of `now`.
    ///
    /// The expiry is computed on `now`'s calendar. Registry failures are
    /// logged and leave `serial` empty; they never block issuance.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingField`] before any crypto work if the
    /// name, contact or plan is blank, [`LicenseError::Serialization`] if the
    /// record cannot be encoded, and [`LicenseError::Crypto`] if encryption
    /// fails.
    pub fn issue<Tz: TimeZone>(
        &self,
        request: &IssueRequest,
        now: &DateTime<Tz>,
    ) -> LicenseResult<IssuedLicense> {
        request.validate()?;

        let plan = request.plan.trim();
        let issued_at = now.with_timezone(&Utc);
        let expires_at = compute_expiry(plan, now).with_timezone(&Utc);

        let record = Entitlement::new(
            request.holder_name.trim(),
            request.contact.trim(),
            plan,
            issued_at,
            expires_at,
        );
        let token = encrypt_token(&self.key, &record.encode()?)?;

        let serial = self.register(&record, &token, request.address.as_deref());

        info!(
            serial = serial.as_deref().unwrap_or("-"),
            plan = %record.plan,
            %expires_at,
            "license issued"
        );

        Ok(IssuedLicense {
            token,
            expires_at,
            serial,
        })
    }

    /// Issues a token against the local clock.
    pub fn issue_now(&self, request: &IssueRequest) -> LicenseResult<IssuedLicense> {
        self.issue(request, &Local::now())
    }

    fn register(&self, record: &Entitlement, token: &str, address: Option<&str>) -> Option<String> {
        let registry = self.registry.as_ref()?;

        let entry = RegistryEntry {
            token: token.to_string(),
            holder_name: record.holder_name.clone(),
            address: address.map(str::to_string),
            contact: record.contact.clone(),
            plan: record.plan.clone(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
        };

        match registry.register(entry) {
            Ok(serial) => Some(serial),
            Err(e) => {
                warn!(error = %e, "registry append failed, license issued without serial");
                None
            }
        }
    }
}

impl std::fmt::Debug for Issuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Issuer")
            .field("key", &self.key)
            .field("registry", &self.registry.is_some())
            .finish()
    }
}
