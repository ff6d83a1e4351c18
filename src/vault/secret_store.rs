//! The vault secret: proof that a passphrase is the right one.
//!
//! `SecretStore` is the authority for "is this vault initialized, and does
//! this passphrase match".  The first successful `reconcile` on a file with
//! no secret creates one; every later call only verifies and never writes.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroize;

use super::document::{read_document, write_document, KdfHeader};
use crate::crypto::kdf::{derive_key, generate_salt, KdfParams};
use crate::crypto::DerivedKey;
use crate::errors::{Result, VaultError};

/// The base64 text stored under the document's `secret` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSecret(String);

impl EncodedSecret {
    /// Encode raw verifier bytes.
    pub fn encode(bytes: &[u8]) -> Self {
        Self(BASE64.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode with standard padding handling.
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.0)
            .map_err(|e| VaultError::SerializationError(format!("vault secret: {e}")))
    }
}

impl From<String> for EncodedSecret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Loads, creates and verifies the secret of one vault file.
#[derive(Debug, Clone)]
pub struct SecretStore {
    path: PathBuf,
    /// Parameters used when a new vault is created.
    params: KdfParams,
}

impl SecretStore {
    pub fn new(path: impl Into<PathBuf>, params: KdfParams) -> Self {
        Self {
            path: path.into(),
            params,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored secret.  A missing vault file yields `None`.
    pub fn load(&self) -> Result<Option<EncodedSecret>> {
        Ok(read_document(&self.path)?
            .and_then(|doc| doc.secret)
            .map(EncodedSecret::from))
    }

    /// Authenticate `passphrase` against the vault, creating the secret on
    /// first use.
    ///
    /// Returns the freshly derived key on success.  A stored secret that is
    /// the empty string yields `Ok(None)`: nothing to check against and no
    /// usable key.
    pub fn reconcile(&self, passphrase: &[u8]) -> Result<Option<DerivedKey>> {
        if passphrase.is_empty() {
            return Err(VaultError::InvalidInput("passphrase cannot be empty".into()));
        }

        let document = read_document(&self.path)?.unwrap_or_default();
        match document.secret {
            None => self.create(passphrase).map(Some),
            Some(stored) => self.check(passphrase, stored, document.kdf),
        }
    }

    /// Authenticate `passphrase` against an existing vault.
    ///
    /// Like `reconcile`, but a missing file or secret is a storage error
    /// instead of a new vault.
    pub fn verify(&self, passphrase: &[u8]) -> Result<Option<DerivedKey>> {
        if passphrase.is_empty() {
            return Err(VaultError::InvalidInput("passphrase cannot be empty".into()));
        }

        let Some(document) = read_document(&self.path)? else {
            return Err(VaultError::storage(
                &self.path,
                "vault file does not exist — run setup first",
            ));
        };
        let Some(stored) = document.secret else {
            return Err(VaultError::storage(
                &self.path,
                "vault has no secret — run setup first",
            ));
        };
        self.check(passphrase, stored, document.kdf)
    }

    fn check(
        &self,
        passphrase: &[u8],
        stored: String,
        kdf: Option<KdfHeader>,
    ) -> Result<Option<DerivedKey>> {
        if stored.is_empty() {
            tracing::warn!(path = %self.path.display(), "vault secret is empty");
            return Ok(None);
        }
        let stored = EncodedSecret::from(stored);

        let kdf = kdf.ok_or_else(|| {
            VaultError::storage(&self.path, "vault has a secret but no key-derivation header")
        })?;
        let params = kdf.params();
        params.validate().map_err(|e| {
            VaultError::storage(&self.path, format!("bad key-derivation header: {e}"))
        })?;

        let mut decoded = match stored.decode() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "stored secret does not decode");
                return Err(VaultError::InvalidSecret);
            }
        };

        let candidate = derive_key(passphrase, &kdf.salt, &params)?;
        let matched = candidate.matches_verifier(&decoded);
        decoded.zeroize();

        if matched? {
            tracing::info!(path = %self.path.display(), "vault unlocked");
            Ok(Some(candidate))
        } else {
            tracing::debug!(path = %self.path.display(), "passphrase rejected");
            Err(VaultError::InvalidSecret)
        }
    }

    /// Overwrite the secret and key-derivation header, keeping every site
    /// entry already in the file.
    pub fn save(&self, secret: &EncodedSecret, kdf: &KdfHeader) -> Result<()> {
        let mut document = read_document(&self.path)?.unwrap_or_default();
        document.secret = Some(secret.as_str().to_string());
        document.kdf = Some(kdf.clone());
        write_document(&self.path, &document)
    }

    fn create(&self, passphrase: &[u8]) -> Result<DerivedKey> {
        let salt = generate_salt();
        let key = derive_key(passphrase, &salt, &self.params)?;

        let mut verifier = key.verifier()?;
        let secret = EncodedSecret::encode(&verifier);
        verifier.zeroize();

        self.save(&secret, &KdfHeader::new(&salt, &self.params))?;
        tracing::info!(path = %self.path.display(), "vault created");
        Ok(key)
    }
}
