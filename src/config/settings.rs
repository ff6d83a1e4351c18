use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::errors::{Result, VaultError};

/// Per-directory configuration, loaded from `.vaultkeep.toml`.
///
/// Every field has a default so VaultKeep works without any config file.
/// The Argon2 values only apply to vaults created afterwards; an existing
/// vault always uses the parameters stored inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file used when no output file is given.
    #[serde(default = "default_vault_file")]
    pub default_vault_file: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 pass count (default: 1).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    crate::vault::DEFAULT_VAULT_FILE.to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    1
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_vault_file: default_vault_file(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".vaultkeep.toml";

    /// Load settings from `<dir>/.vaultkeep.toml`.
    ///
    /// Missing file: defaults.  Unparseable file or out-of-range Argon2
    /// values: error.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.kdf_params().validate().map_err(|e| {
            VaultError::ConfigError(format!("{}: {e}", config_path.display()))
        })?;

        tracing::debug!(path = %config_path.display(), "settings loaded");
        Ok(settings)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_match_vault_defaults() {
        let s = Settings::default();
        assert_eq!(s.default_vault_file, "vault.json");
        assert_eq!(s.kdf_params(), KdfParams::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_vault_file, "vault.json");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
default_vault_file = "passwords.json"
argon2_memory_kib = 131072
argon2_iterations = 2
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join(".vaultkeep.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_vault_file, "passwords.json");
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 2);
        assert_eq!(settings.argon2_parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".vaultkeep.toml"), "argon2_memory_kib = 8192\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.argon2_memory_kib, 8_192);
        assert_eq!(settings.default_vault_file, "vault.json");
        assert_eq!(settings.argon2_iterations, 1);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".vaultkeep.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn load_errors_on_weak_argon2_params() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".vaultkeep.toml"), "argon2_memory_kib = 64\n").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }
}
