//! Passphrase-based key derivation using Argon2id.
//!
//! The defaults are fixed for every vault (1 pass, 64 MB, 4 lanes).  The
//! parameters and the random salt used at creation are persisted in the
//! vault document so re-validation derives exactly the same key.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Length of the per-vault salt in bytes.
pub const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Maximum memory cost in KiB (4 GB).
const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Maximum number of passes.
const MAX_ITERATIONS: u32 = 64;

/// Maximum number of lanes.
const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of passes (default: 1).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 1,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Reject parameters below the safety floor or above the resource cap.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&self.memory_kib) {
            return Err(VaultError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be between {MIN_MEMORY_KIB} and {MAX_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(VaultError::KeyDerivationFailed(format!(
                "Argon2 iterations must be between 1 and {MAX_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(VaultError::KeyDerivationFailed(format!(
                "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from `passphrase` and `salt` with Argon2id.
///
/// The same passphrase, salt and params always produce the same key.
pub fn derive_key(passphrase: &[u8], salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(VaultError::InvalidInput("passphrase cannot be empty".into()));
    }
    params.validate()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    tracing::debug!(
        memory_kib = params.memory_kib,
        iterations = params.iterations,
        parallelism = params.parallelism,
        "deriving key"
    );

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase, salt, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(DerivedKey::new(key))
}

/// Generate a cryptographically random salt for a new vault.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
