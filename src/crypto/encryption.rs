//! AES-256-GCM authenticated encryption.
//!
//! Every `seal` generates a fresh random 12-byte nonce from the OS CSPRNG
//! and returns it next to the ciphertext; `open` needs both back.  No
//! associated data is bound.
//!
//! Ciphertext layout: `ciphertext || 16-byte auth tag`.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::keys::KEY_LEN;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Output of a single `seal` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// An AEAD context bound to one key for the lifetime of an unlocked vault.
pub struct CipherSession {
    cipher: Aes256Gcm,
}

impl CipherSession {
    /// Build the cipher from raw key bytes, which must be exactly 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_LEN {
            return Err(VaultError::InvalidKeyLength(key.len()));
        }
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::InvalidKeyLength(key.len()))?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` under a freshly generated nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Sealed> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

        Ok(Sealed {
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }

    /// Decrypt and verify `ciphertext`.  Fails closed on any mismatch.
    pub fn open(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
        if nonce.len() != NONCE_LEN {
            return Err(VaultError::DecryptionFailed);
        }
        let nonce = Nonce::from_slice(nonce);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }
}

/// Encrypt `plaintext` with a 32-byte `key`.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Sealed> {
    CipherSession::new(key)?.seal(plaintext)
}

/// Decrypt data produced by `seal` with the same key.
pub fn open(key: &[u8], ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    CipherSession::new(key)?.open(ciphertext, nonce)
}
