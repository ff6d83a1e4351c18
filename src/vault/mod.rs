//! Vault module — the JSON credential vault.
//!
//! This module provides:
//! - The JSON document and its atomic persistence (`document`)
//! - Encrypted credential records and field blobs (`record`)
//! - The vault secret: creation and passphrase checks (`secret_store`)
//! - Site-keyed record updates (`record_store`)
//! - The unlocked session and its state machine (`controller`)

pub mod controller;
pub mod document;
pub mod record;
pub mod record_store;
pub mod secret_store;

// Re-export the most commonly used items.
pub use controller::{
    resolve_output_path, ResetOutcome, UnlockedVault, VaultController, VaultState,
    DEFAULT_VAULT_FILE,
};
pub use document::{KdfHeader, VaultDocument};
pub use record::{decrypt_field, encrypt_field, Credential, CredentialRecord};
pub use record_store::RecordStore;
pub use secret_store::{EncodedSecret, SecretStore};
