//! Cryptographic primitives for VaultKeep.
//!
//! This module provides:
//! - AES-256-GCM sealing and opening (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - The derived key and its HKDF sub-keys (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{open, seal, CipherSession, Sealed};
pub use kdf::{derive_key, generate_salt, KdfParams};
pub use keys::DerivedKey;
