//! Integration tests for the VaultKeep crypto module.

use vaultkeep::crypto::keys::DerivedKey;
use vaultkeep::crypto::{derive_key, generate_salt, open, seal, CipherSession, KdfParams};
use vaultkeep::errors::VaultError;

fn fast_params() -> KdfParams {
    KdfParams {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"correct horse battery staple";

    let sealed = seal(&key, plaintext).expect("seal should succeed");

    // 16-byte auth tag on top of the plaintext.
    assert_eq!(sealed.ciphertext.len(), plaintext.len() + 16);

    let recovered = open(&key, &sealed.ciphertext, &sealed.nonce).expect("open should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn seal_uses_a_fresh_nonce_each_time() {
    let key = [0xCDu8; 32];

    let a = seal(&key, b"same").expect("seal 1");
    let b = seal(&key, b"same").expect("seal 2");

    assert_ne!(a.nonce, b.nonce, "nonces must never repeat");
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn flipped_ciphertext_byte_fails_authentication() {
    let key = [0x11u8; 32];
    let mut sealed = seal(&key, b"pw123").expect("seal");
    sealed.ciphertext[0] ^= 0x01;

    let err = open(&key, &sealed.ciphertext, &sealed.nonce).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed));
}

#[test]
fn flipped_tag_byte_fails_authentication() {
    let key = [0x11u8; 32];
    let mut sealed = seal(&key, b"pw123").expect("seal");
    let last = sealed.ciphertext.len() - 1;
    sealed.ciphertext[last] ^= 0x80;

    assert!(open(&key, &sealed.ciphertext, &sealed.nonce).is_err());
}

#[test]
fn open_with_wrong_key_fails() {
    let sealed = seal(&[0x11u8; 32], b"TOP_SECRET").expect("seal");
    let err = open(&[0x22u8; 32], &sealed.ciphertext, &sealed.nonce).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed));
}

#[test]
fn wrong_key_length_is_a_config_error() {
    let err = seal(&[0u8; 31], b"x").unwrap_err();
    assert!(matches!(err, VaultError::InvalidKeyLength(31)));

    let err = open(&[0u8; 33], b"x", &[0u8; 12]).unwrap_err();
    assert!(matches!(err, VaultError::InvalidKeyLength(33)));
}

#[test]
fn empty_plaintext_roundtrips() {
    let session = CipherSession::new(&[0x5Au8; 32]).expect("session");
    let sealed = session.seal(b"").expect("seal");
    assert!(session
        .open(&sealed.ciphertext, &sealed.nonce)
        .expect("open")
        .is_empty());
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_is_deterministic_with_default_params() {
    let salt = [0x42u8; 16];
    let params = KdfParams::default();

    let k1 = derive_key(b"secret", &salt, &params).expect("derive 1");
    let k2 = derive_key(b"secret", &salt, &params).expect("derive 2");

    assert_eq!(k1.as_bytes(), k2.as_bytes());
    assert_eq!(k1.as_bytes().len(), 32);
}

#[test]
fn derive_differs_per_passphrase() {
    let salt = generate_salt();
    let k1 = derive_key(b"secret", &salt, &fast_params()).expect("derive 1");
    let k2 = derive_key(b"invalid", &salt, &fast_params()).expect("derive 2");
    assert_ne!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn derive_rejects_empty_passphrase() {
    let err = derive_key(b"", &generate_salt(), &fast_params()).unwrap_err();
    assert!(matches!(err, VaultError::InvalidInput(_)));
}

#[test]
fn derived_key_seals_through_record_key() {
    let key: DerivedKey = derive_key(b"secret", &generate_salt(), &fast_params()).expect("derive");
    let record_key = key.record_key().expect("record key");

    let session = CipherSession::new(&record_key).expect("session");
    let sealed = session.seal(b"alice").expect("seal");

    // The raw key is not the one the session encrypts with.
    assert!(open(key.as_bytes(), &sealed.ciphertext, &sealed.nonce).is_err());
    assert_eq!(
        session.open(&sealed.ciphertext, &sealed.nonce).expect("open"),
        b"alice"
    );
}
