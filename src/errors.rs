use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in VaultKeep.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Input errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid output file: {0}")]
    InvalidOutputPath(String),

    // --- Authentication errors ---
    #[error("Invalid secret provided")]
    InvalidSecret,

    #[error("Vault is not unlocked — run `setup` first")]
    NotUnlocked,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Cipher key must be exactly 32 bytes (got {0})")]
    InvalidKeyLength(usize),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Storage errors ---
    #[error("Storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    #[error("No credentials stored for '{0}'")]
    SiteNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Unknown command '{name}', the commands available are: {available}")]
    UnknownCommand { name: String, available: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Build a `Storage` error for `path`.
    pub fn storage(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Storage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for VaultKeep results.
pub type Result<T> = std::result::Result<T, VaultError>;
