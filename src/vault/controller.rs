//! Session orchestration: setup, add, reveal and reset.
//!
//! `UnlockedVault` is the handle returned by a successful passphrase check.
//! It owns the derived key and the cipher session; nothing else does.
//! `VaultController` drives the state machine a front end needs:
//!
//! ```text
//! Uninitialized --setup--> Unlocked --add (vault replaced)--> Locked
//!        ^                    |                                  |
//!        +------ reset -------+------------- reset --------------+
//! ```

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use zeroize::{Zeroize, Zeroizing};

use super::document::temp_path;
use super::record::{open_encoded, Credential, CredentialRecord};
use super::record_store::{validate_site, RecordStore};
use super::secret_store::SecretStore;
use crate::config::Settings;
use crate::crypto::{CipherSession, DerivedKey, KdfParams};
use crate::errors::{Result, VaultError};

/// File name used when setup is given an empty output path.
pub const DEFAULT_VAULT_FILE: &str = "vault.json";

// ---------------------------------------------------------------------------
// UnlockedVault
// ---------------------------------------------------------------------------

/// A vault whose passphrase has been verified.
pub struct UnlockedVault {
    path: PathBuf,
    key: DerivedKey,
    session: CipherSession,
    secrets: SecretStore,
    records: RecordStore,
}

impl UnlockedVault {
    /// Authenticate against the vault at `path`, creating it on first use.
    ///
    /// `params` only matter when the vault is created; an existing vault is
    /// always re-derived with the parameters stored in it.
    pub fn open(path: impl Into<PathBuf>, passphrase: &[u8], params: KdfParams) -> Result<Self> {
        let path = path.into();
        let secrets = SecretStore::new(&path, params);
        let key = secrets.reconcile(passphrase)?;
        Self::with_key(path, secrets, key)
    }

    /// Authenticate against the vault at `path` without ever creating it.
    ///
    /// A missing file or a file without a secret is a storage error.
    pub fn unlock_existing(path: impl Into<PathBuf>, passphrase: &[u8]) -> Result<Self> {
        let path = path.into();
        let secrets = SecretStore::new(&path, KdfParams::default());
        let key = secrets.verify(passphrase)?;
        Self::with_key(path, secrets, key)
    }

    fn with_key(path: PathBuf, secrets: SecretStore, key: Option<DerivedKey>) -> Result<Self> {
        let key = key.ok_or_else(|| {
            VaultError::storage(
                &path,
                "vault secret is empty — reset the vault and run setup again",
            )
        })?;

        let mut record_key = key.record_key()?;
        let session = CipherSession::new(&record_key);
        record_key.zeroize();

        Ok(Self {
            records: RecordStore::new(&path),
            session: session?,
            secrets,
            key,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &DerivedKey {
        &self.key
    }

    /// Encrypt `username` and `password` and store them under `site`.
    pub fn add(&self, site: &str, username: &str, password: &str) -> Result<()> {
        validate_site(site)?;
        self.ensure_current()?;

        let record = CredentialRecord::seal(&self.session, username, password)?;
        self.records.upsert(site, record)
    }

    /// Decrypt the credentials stored for `site`.
    pub fn reveal(&self, site: &str) -> Result<Credential> {
        self.records.get(site)?.open(&self.session)
    }

    /// Decrypt a single stored field (`username` or `password`).
    pub fn decrypt_field(&self, label: &str, encoded: &str) -> Result<Zeroizing<Vec<u8>>> {
        open_encoded(&self.session, label, encoded)
    }

    /// Site labels stored in the vault, sorted.
    pub fn sites(&self) -> Result<Vec<String>> {
        self.records.sites()
    }

    /// Check that the file on disk still belongs to this session's key.
    fn ensure_current(&self) -> Result<()> {
        let Some(stored) = self.secrets.load()? else {
            tracing::warn!(path = %self.path.display(), "vault file no longer holds a secret");
            return Err(VaultError::InvalidSecret);
        };

        let mut decoded = stored.decode().map_err(|_| VaultError::InvalidSecret)?;
        let matched = self.key.matches_verifier(&decoded);
        decoded.zeroize();

        if matched? {
            Ok(())
        } else {
            tracing::warn!(path = %self.path.display(), "vault secret changed since unlock");
            Err(VaultError::InvalidSecret)
        }
    }
}

impl fmt::Debug for UnlockedVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedVault")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// VaultController
// ---------------------------------------------------------------------------

/// Observable state of a `VaultController`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No successful setup yet (or reset since).
    Uninitialized,
    /// A passphrase was verified; records can be added.
    Unlocked,
    /// The session was dropped because the vault file changed under it.
    Locked,
}

/// Result of `VaultController::reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Removed(PathBuf),
    NothingToRemove(PathBuf),
}

enum Session {
    Uninitialized,
    Unlocked(UnlockedVault),
    Locked,
}

/// Holds the unlocked session for one front end.
pub struct VaultController {
    base_dir: PathBuf,
    default_file: String,
    params: KdfParams,
    /// Vault file of the current session.
    path: Option<PathBuf>,
    /// Vault file removed by the last reset, so a repeated reset targets it
    /// again instead of the default file.
    last_removed: Option<PathBuf>,
    session: Session,
}

impl VaultController {
    /// A controller resolving relative vault paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            default_file: DEFAULT_VAULT_FILE.to_string(),
            params: KdfParams::default(),
            path: None,
            last_removed: None,
            session: Session::Uninitialized,
        }
    }

    /// A controller using the default file name and Argon2 parameters from
    /// `settings`.
    pub fn with_settings(base_dir: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            default_file: settings.default_vault_file.clone(),
            params: settings.kdf_params(),
            ..Self::new(base_dir)
        }
    }

    /// Override the Argon2 parameters used for newly created vaults.
    pub fn with_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }

    pub fn state(&self) -> VaultState {
        match self.session {
            Session::Uninitialized => VaultState::Uninitialized,
            Session::Unlocked(_) => VaultState::Unlocked,
            Session::Locked => VaultState::Locked,
        }
    }

    /// The vault file of the current session, if any.
    pub fn output_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The unlocked vault, or `NotUnlocked`.
    pub fn vault(&self) -> Result<&UnlockedVault> {
        match &self.session {
            Session::Unlocked(vault) => Ok(vault),
            Session::Uninitialized | Session::Locked => Err(VaultError::NotUnlocked),
        }
    }

    /// Validate `output`, authenticate `passphrase` against that vault
    /// (creating it if needed), and unlock.
    ///
    /// On failure the controller keeps its previous state.
    pub fn setup(&mut self, passphrase: &[u8], output: &str) -> Result<&UnlockedVault> {
        let path = resolve_output_path(&self.base_dir, output, &self.default_file)?;
        let vault = UnlockedVault::open(&path, passphrase, self.params)?;
        self.install(vault)
    }

    /// Like `setup`, but only unlocks a vault that already exists.
    ///
    /// A missing vault file is a storage error and nothing is written.
    pub fn unlock(&mut self, passphrase: &[u8], output: &str) -> Result<&UnlockedVault> {
        let path = resolve_output_path(&self.base_dir, output, &self.default_file)?;
        let vault = UnlockedVault::unlock_existing(&path, passphrase)?;
        self.install(vault)
    }

    fn install(&mut self, vault: UnlockedVault) -> Result<&UnlockedVault> {
        self.path = Some(vault.path().to_path_buf());
        self.last_removed = None;
        self.session = Session::Unlocked(vault);
        self.vault()
    }

    /// Encrypt and store credentials for `site`.
    ///
    /// If the vault file was deleted or replaced since setup, the session
    /// is dropped and the controller becomes `Locked`.
    pub fn add(&mut self, username: &str, password: &str, site: &str) -> Result<()> {
        let result = self.vault()?.add(site, username, password);
        if let Err(VaultError::InvalidSecret) = result {
            self.session = Session::Locked;
        }
        result
    }

    /// Decrypt the credentials stored for `site`.
    pub fn reveal(&self, site: &str) -> Result<Credential> {
        self.vault()?.reveal(site)
    }

    /// Site labels stored in the unlocked vault.
    pub fn sites(&self) -> Result<Vec<String>> {
        self.vault()?.sites()
    }

    /// Delete the vault file and drop the session.
    ///
    /// Removes the file of the current session (or the one removed by the
    /// previous reset), else the default file in the base directory.
    /// Calling it again reports `NothingToRemove` instead of failing.
    pub fn reset(&mut self) -> Result<ResetOutcome> {
        let path = match self.path.as_ref().or(self.last_removed.as_ref()) {
            Some(path) => path.clone(),
            None => resolve_output_path(&self.base_dir, "", &self.default_file)?,
        };
        self.remove_vault(path)
    }

    /// Delete the vault at `output`, validated like setup's output path.
    ///
    /// The session is dropped only if it belongs to that file.
    pub fn reset_file(&mut self, output: &str) -> Result<ResetOutcome> {
        let path = resolve_output_path(&self.base_dir, output, &self.default_file)?;
        self.remove_vault(path)
    }

    fn remove_vault(&mut self, path: PathBuf) -> Result<ResetOutcome> {
        // Leftover from an interrupted write, if any.
        let temp = temp_path(&path);
        match fs::remove_file(&temp) {
            Ok(()) => tracing::debug!(path = %temp.display(), "stale temp file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %temp.display(), error = %e, "cannot remove temp file");
            }
        }

        let outcome = match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "vault removed");
                ResetOutcome::Removed(path)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no vault to remove");
                ResetOutcome::NothingToRemove(path)
            }
            Err(e) => return Err(VaultError::storage(&path, format!("cannot remove vault: {e}"))),
        };

        let removed = match &outcome {
            ResetOutcome::Removed(p) | ResetOutcome::NothingToRemove(p) => p,
        };
        if self.path.is_none() || self.path.as_deref() == Some(removed.as_path()) {
            self.session = Session::Uninitialized;
            self.path = None;
            self.last_removed = Some(removed.clone());
        }
        Ok(outcome)
    }
}

/// Resolve the vault file for `output`.
///
/// Empty means `default_file`.  Otherwise the file name must have exactly
/// one `.`, a non-empty stem and a `json` extension (any case).  Relative
/// paths are joined onto `base_dir`.
pub fn resolve_output_path(base_dir: &Path, output: &str, default_file: &str) -> Result<PathBuf> {
    let output = if output.is_empty() {
        default_file
    } else {
        output
    };

    let path = Path::new(output);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| VaultError::InvalidOutputPath(format!("'{output}' does not name a file")))?;

    let mut parts = name.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(stem), Some(ext), None) if !stem.is_empty() => {
            if !ext.eq_ignore_ascii_case("json") {
                return Err(VaultError::InvalidOutputPath(format!(
                    "'{output}' is not a .json file — only .json format is accepted"
                )));
            }
        }
        _ => {
            return Err(VaultError::InvalidOutputPath(format!(
                "'{output}' must be a file name with a single .json extension"
            )));
        }
    }

    Ok(base_dir.join(path))
}
