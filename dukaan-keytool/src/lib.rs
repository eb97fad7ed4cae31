//! Response shapes and command handlers for the keytool.
//!
//! Responses keep the field names the shop front-end already consumes
//! (`isValid`, `licenseKey`, `expiryDate`, ...).

use chrono::{DateTime, TimeZone, Utc};
use dukaan_license::{
    cached_access, AccessDecision, DenyReason, FileTrustStore, IssueRequest, IssuedLicense, Issuer,
    LicenseClient, LicenseConfig, LicenseError, LicenseResult, LocalTransport, TrustStore,
    ValidationOutcome, Validator, SECRET_ENV_VAR,
};
use serde::{Deserialize, Serialize};

/// Body returned by `issue` and `validate`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub message: String,
}

impl KeyResponse {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            license_key: None,
            serial: None,
            status: None,
            plan: None,
            name: None,
            contact: None,
            expiry_date: None,
            message: message.into(),
        }
    }

    /// Response for a freshly issued key.
    pub fn issued(license: &IssuedLicense) -> Self {
        Self {
            is_valid: true,
            license_key: Some(license.token.clone()),
            serial: license.serial.clone(),
            expiry_date: Some(license.expires_at),
            ..Self::rejected("License created")
        }
    }

    /// Response for a classified token.
    pub fn from_outcome(outcome: &ValidationOutcome) -> Self {
        let base = Self {
            is_valid: outcome.grants_access(),
            expiry_date: outcome.expires_at(),
            ..Self::rejected(outcome.message())
        };

        match outcome {
            ValidationOutcome::Valid {
                plan,
                holder_name,
                contact,
                ..
            } => Self {
                plan: Some(plan.clone()),
                name: Some(holder_name.clone()),
                contact: Some(contact.clone()),
                ..base
            },
            ValidationOutcome::Trial { .. } => Self {
                plan: Some("TRIAL".to_string()),
                ..base
            },
            ValidationOutcome::Expired { .. } => Self {
                status: Some("expired".to_string()),
                ..base
            },
            ValidationOutcome::Malformed { .. } => base,
        }
    }
}

/// Issues a key, mapping input errors to a rejected response.
pub fn issue_key<Tz: TimeZone>(
    issuer: &Issuer,
    request: &IssueRequest,
    now: &DateTime<Tz>,
) -> LicenseResult<KeyResponse> {
    match issuer.issue(request, now) {
        Ok(license) => Ok(KeyResponse::issued(&license)),
        Err(LicenseError::MissingField(_)) => {
            Ok(KeyResponse::rejected("name, contact and plan required"))
        }
        Err(e) => Err(e),
    }
}

/// Validates a key as of `now`.
pub fn validate_key<Tz: TimeZone>(
    validator: &Validator,
    token: &str,
    now: &DateTime<Tz>,
) -> KeyResponse {
    if token.trim().is_empty() {
        return KeyResponse::rejected("key required");
    }
    KeyResponse::from_outcome(&validator.classify(token, now))
}

/// Body returned by `activate` and `status`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessReport {
    pub granted: bool,
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub message: String,
}

impl From<&AccessDecision> for AccessReport {
    fn from(decision: &AccessDecision) -> Self {
        let (access, plan, expiry_date, message) = match decision {
            AccessDecision::Granted {
                plan, expires_at, ..
            } => ("granted", Some(plan.clone()), Some(*expires_at), "Key valid".to_string()),
            AccessDecision::TrialAccess { expires_at } => (
                "trial",
                Some("TRIAL".to_string()),
                Some(*expires_at),
                "Trial valid".to_string(),
            ),
            AccessDecision::OfflineGrace => {
                ("offline", None, None, "Offline: cached license active".to_string())
            }
            AccessDecision::Denied { reason } => {
                let (expiry, message) = match reason {
                    DenyReason::MissingToken => (None, "key required".to_string()),
                    DenyReason::Expired { expires_at } => {
                        (Some(*expires_at), "License expired".to_string())
                    }
                    DenyReason::Malformed { reason } => (None, reason.to_string()),
                    DenyReason::Unauthenticated => (None, "No verified license".to_string()),
                };
                ("denied", None, expiry, message)
            }
        };

        Self {
            granted: decision.is_granted(),
            access: access.to_string(),
            plan,
            expiry_date,
            message,
        }
    }
}

/// Validates `token` now and caches it in `store` when accepted.
pub fn activate_key<S: TrustStore>(validator: Validator, store: S, token: &str) -> AccessReport {
    let client = LicenseClient::new(LocalTransport::new(validator), store);
    AccessReport::from(&client.check(token))
}

/// Reports access from the cache in `store` without a key.
pub fn license_status<S: TrustStore + ?Sized>(store: &S) -> AccessReport {
    AccessReport::from(&cached_access(store))
}

/// Trust store at `DUKAAN_TRUST_STORE`, or the default path.
pub fn trust_store_from_env() -> FileTrustStore {
    FileTrustStore::from_lookup(|name| std::env::var(name).ok())
}

/// Builds the configuration, preferring an explicit secret over the
/// environment.
pub fn load_config(secret: Option<String>) -> LicenseResult<LicenseConfig> {
    LicenseConfig::from_lookup(|name| {
        if name == SECRET_ENV_VAR {
            secret.clone().or_else(|| std::env::var(name).ok())
        } else {
            std::env::var(name).ok()
        }
    })
}
