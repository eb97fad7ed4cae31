use dukaan_crypto::{derive_secret_key, generate_random_key, DerivedKey, KEY_SIZE};

// ── derive_secret_key ────────────────────────────────────────────

#[test]
fn same_secret_same_key() {
    let key1 = derive_secret_key("CHANGE_ME_SECRET_123!");
    let key2 = derive_secret_key("CHANGE_ME_SECRET_123!");
    assert_eq!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn different_secrets_different_keys() {
    let key1 = derive_secret_key("secret-one");
    let key2 = derive_secret_key("secret-two");
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn secret_is_case_sensitive() {
    let key1 = derive_secret_key("Secret");
    let key2 = derive_secret_key("secret");
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn unicode_secret_derives() {
    let key = derive_secret_key("दुकान-प्रो-🔑");
    assert_eq!(key.as_bytes().len(), KEY_SIZE);
}

#[test]
fn empty_secret_still_derives() {
    let key = derive_secret_key("");
    assert_eq!(key.as_bytes().len(), KEY_SIZE);
}

// ── generate_random_key ──────────────────────────────────────────

#[test]
fn generate_random_key_produces_unique_keys() {
    let key1 = generate_random_key();
    let key2 = generate_random_key();
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

// ── DerivedKey ───────────────────────────────────────────────────

#[test]
fn from_bytes_preserves_bytes() {
    let key = DerivedKey::from_bytes([7u8; 32]);
    assert_eq!(key.as_bytes(), &[7u8; 32]);
}

#[test]
fn from_slice_accepts_exact_length() {
    let key = DerivedKey::from_slice(&[9u8; 32]).unwrap();
    assert_eq!(key.as_bytes(), &[9u8; 32]);
}

#[test]
fn from_slice_rejects_long_input() {
    assert!(DerivedKey::from_slice(&[0u8; 33]).is_err());
}

#[test]
fn debug_redacts_key_material() {
    let key = derive_secret_key("hunter2");
    let debug = format!("{key:?}");
    assert!(debug.contains("REDACTED"));
    assert!(!debug.contains(&format!("{:?}", key.as_bytes())));
}

#[test]
fn clone_is_equal() {
    let key = derive_secret_key("clone-me");
    let copy = key.clone();
    assert_eq!(key.as_bytes(), copy.as_bytes());
}
