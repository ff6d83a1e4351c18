//! The derived vault key and the sub-keys expanded from it.
//!
//! From the Argon2id output we derive, with HKDF-SHA256:
//! - the **verifier** persisted in the vault document to check a passphrase;
//! - the **record key** the cipher session encrypts credential fields with.
//!
//! Neither sub-key reveals the other, so the persisted verifier cannot be
//! used to decrypt records.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of the derived key and its sub-keys (256 bits).
pub const KEY_LEN: usize = 32;

const VERIFIER_INFO: &[u8] = b"vaultkeep-verifier";
const RECORD_KEY_INFO: &[u8] = b"vaultkeep-records";

/// A 32-byte key derived from the vault passphrase.
///
/// Zeroed on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// The value persisted as the vault secret.
    pub fn verifier(&self) -> Result<[u8; KEY_LEN]> {
        hkdf_expand(&self.bytes, VERIFIER_INFO)
    }

    /// The key credential fields are sealed with.
    pub fn record_key(&self) -> Result<[u8; KEY_LEN]> {
        hkdf_expand(&self.bytes, RECORD_KEY_INFO)
    }

    /// Compare this key's verifier against a stored one in constant time.
    pub fn matches_verifier(&self, stored: &[u8]) -> Result<bool> {
        let mut verifier = self.verifier()?;
        let matched: bool = verifier.as_slice().ct_eq(stored).into();
        verifier.zeroize();
        Ok(matched)
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

fn hkdf_expand(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
