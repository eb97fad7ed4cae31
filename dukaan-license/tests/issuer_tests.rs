mod common;

use common::{at, end_of, request, test_key, BrokenRegistry};
use dukaan_crypto::decrypt_token;
use dukaan_license::{
    Entitlement, IssueRequest, Issuer, LicenseError, MemoryRegistry, SerialRegistry,
};
use std::sync::Arc;

// ── Input validation ─────────────────────────────────────────────

#[test]
fn blank_fields_are_rejected() {
    let issuer = Issuer::new(test_key());
    let now = at(2024, 1, 15, 0, 0, 0);

    let cases = [
        (IssueRequest::new("", "c", "1 Month"), "holder_name"),
        (IssueRequest::new("n", "   ", "1 Month"), "contact"),
        (IssueRequest::new("n", "c", ""), "plan"),
    ];
    for (req, field) in cases {
        match issuer.issue(&req, &now) {
            Err(LicenseError::MissingField(f)) => assert_eq!(f, field),
            other => panic!("expected MissingField({field}), got {other:?}"),
        }
    }
}

#[test]
fn blank_fields_never_reach_the_registry() {
    let registry = Arc::new(MemoryRegistry::new());
    let issuer = Issuer::new(test_key()).with_registry(registry.clone());
    let _ = issuer.issue(&IssueRequest::new("", "", ""), &at(2024, 1, 15, 0, 0, 0));
    assert!(registry.customers().unwrap().is_empty());
}

// ── Token contents ───────────────────────────────────────────────

#[test]
fn token_decrypts_to_the_requested_record() {
    let now = at(2024, 1, 15, 9, 30, 0);
    let issued = Issuer::new(test_key())
        .issue(&IssueRequest::new("  Ravi Stores ", " ravi@example.com ", " 6 Month "), &now)
        .unwrap();

    let payload = decrypt_token(&test_key(), &issued.token).unwrap();
    let record = Entitlement::decode(&payload).unwrap();

    assert_eq!(record.holder_name, "Ravi Stores");
    assert_eq!(record.contact, "ravi@example.com");
    assert_eq!(record.plan, "6 MONTH");
    assert_eq!(record.issued_at, now);
    assert_eq!(record.expires_at, end_of(2024, 7, 15));
    assert_eq!(issued.expires_at, record.expires_at);
}

#[test]
fn identical_requests_produce_different_tokens() {
    let now = at(2024, 1, 15, 0, 0, 0);
    let issuer = Issuer::new(test_key());
    let a = issuer.issue(&request("1 Year"), &now).unwrap();
    let b = issuer.issue(&request("1 Year"), &now).unwrap();
    assert_ne!(a.token, b.token);
    assert_eq!(a.expires_at, b.expires_at);
}

#[test]
fn unknown_plan_still_issues() {
    let issued = Issuer::new(test_key())
        .issue(&request("Lifetime"), &at(2024, 1, 15, 0, 0, 0))
        .unwrap();
    assert_eq!(issued.expires_at, end_of(2024, 2, 15));
}

// ── Registry ─────────────────────────────────────────────────────

#[test]
fn no_registry_means_no_serial() {
    let issued = Issuer::new(test_key())
        .issue(&request("1 Month"), &at(2024, 1, 15, 0, 0, 0))
        .unwrap();
    assert!(issued.serial.is_none());
}

#[test]
fn serials_are_sequential() {
    let registry = Arc::new(MemoryRegistry::new());
    let issuer = Issuer::new(test_key()).with_registry(registry.clone());
    let now = at(2024, 1, 15, 0, 0, 0);

    let first = issuer.issue(&request("1 Month"), &now).unwrap();
    let second = issuer
        .issue(&request("1 Year").with_address("12 MG Road, Pune"), &now)
        .unwrap();

    assert_eq!(first.serial.as_deref(), Some("CUST-0001"));
    assert_eq!(second.serial.as_deref(), Some("CUST-0002"));

    let customers = registry.customers().unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[1].entry.token, second.token);
    assert_eq!(customers[1].entry.address.as_deref(), Some("12 MG Road, Pune"));
    assert_eq!(customers[1].entry.plan, "1 YEAR");
    assert_eq!(customers[0].entry.address, None);
}

#[test]
fn registry_failure_does_not_block_issuance() {
    let issuer = Issuer::new(test_key()).with_registry(Arc::new(BrokenRegistry));
    let issued = issuer
        .issue(&request("1 Month"), &at(2024, 1, 15, 0, 0, 0))
        .unwrap();
    assert!(issued.serial.is_none());
    assert!(!issued.token.is_empty());
}

#[test]
fn concurrent_issuance_allocates_unique_serials() {
    let registry = Arc::new(MemoryRegistry::new());
    let issuer = Issuer::new(test_key()).with_registry(registry.clone());
    let now = at(2024, 1, 15, 0, 0, 0);

    std::thread::scope(|s| {
        for _ in 0..8 {
            let issuer = &issuer;
            s.spawn(move || {
                for _ in 0..10 {
                    issuer.issue(&request("1 Month"), &now).unwrap();
                }
            });
        }
    });

    let mut serials: Vec<String> = registry
        .customers()
        .unwrap()
        .into_iter()
        .map(|c| c.serial)
        .collect();
    serials.sort();
    serials.dedup();
    assert_eq!(serials.len(), 80);
    assert_eq!(serials.last().map(String::as_str), Some("CUST-0080"));
}

#[test]
fn registry_trait_object_is_usable_directly() {
    let registry: Arc<dyn SerialRegistry> = Arc::new(MemoryRegistry::new());
    let issuer = Issuer::new(test_key()).with_registry(registry);
    let issued = issuer.issue(&request("trial"), &at(2024, 1, 15, 0, 0, 0)).unwrap();
    assert_eq!(issued.serial.as_deref(), Some("CUST-0001"));
}

#[test]
fn issuer_debug_hides_key() {
    let issuer = Issuer::new(test_key());
    let debug = format!("{issuer:?}");
    assert!(debug.contains("REDACTED"));
}
