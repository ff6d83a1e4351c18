//! Site-keyed credential records inside the vault document.

use std::path::{Path, PathBuf};

use super::document::{read_document, write_document, VaultDocument, RESERVED_KEYS};
use super::record::CredentialRecord;
use crate::errors::{Result, VaultError};

/// Reads and updates the credential entries of one vault file.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace the record for `site`, leaving every other entry
    /// untouched.
    ///
    /// The vault file must already exist: records cannot be added before
    /// setup has created it.
    pub fn upsert(&self, site: &str, record: CredentialRecord) -> Result<()> {
        validate_site(site)?;

        let mut document = self.existing()?;
        let replaced = document.records.insert(site.to_string(), record).is_some();
        write_document(&self.path, &document)?;

        tracing::info!(site, replaced, "credential record stored");
        Ok(())
    }

    /// Fetch the record stored for `site`.
    pub fn get(&self, site: &str) -> Result<CredentialRecord> {
        validate_site(site)?;
        self.existing()?
            .records
            .remove(site)
            .ok_or_else(|| VaultError::SiteNotFound(site.to_string()))
    }

    /// All site labels, sorted.
    pub fn sites(&self) -> Result<Vec<String>> {
        // BTreeMap keys are already ordered.
        Ok(self.existing()?.records.into_keys().collect())
    }

    fn existing(&self) -> Result<VaultDocument> {
        read_document(&self.path)?.ok_or_else(|| {
            VaultError::storage(&self.path, "vault file does not exist — run setup first")
        })
    }
}

/// Validate that a site label can be stored.
///
/// Must be non-empty, at most 256 characters, and not one of the
/// document's reserved keys.
pub fn validate_site(site: &str) -> Result<()> {
    if site.trim().is_empty() {
        return Err(VaultError::InvalidInput("site cannot be empty".into()));
    }
    if site.len() > 256 {
        return Err(VaultError::InvalidInput(
            "site cannot exceed 256 characters".into(),
        ));
    }
    if RESERVED_KEYS.contains(&site) {
        return Err(VaultError::InvalidInput(format!(
            "'{site}' is reserved and cannot be used as a site"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(tag: &str) -> CredentialRecord {
        CredentialRecord {
            username: format!("u-{tag}"),
            password: format!("p-{tag}"),
        }
    }

    fn store_with_vault() -> (TempDir, RecordStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, r#"{"secret":"AAAA"}"#).unwrap();
        (dir, RecordStore::new(path))
    }

    #[test]
    fn upsert_requires_existing_vault() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("vault.json"));
        let err = store.upsert("example.com", record("a")).unwrap_err();
        assert!(matches!(err, VaultError::Storage { .. }));
        assert!(!store.path().exists());
    }

    #[test]
    fn upsert_keeps_secret_and_other_sites() {
        let (_dir, store) = store_with_vault();
        store.upsert("a.com", record("a")).unwrap();
        store.upsert("b.com", record("b")).unwrap();

        let doc = read_document(store.path()).unwrap().unwrap();
        assert_eq!(doc.secret.as_deref(), Some("AAAA"));
        assert_eq!(doc.records.len(), 2);
        assert_eq!(store.get("a.com").unwrap(), record("a"));
    }

    #[test]
    fn upsert_overwrites_same_site() {
        let (_dir, store) = store_with_vault();
        store.upsert("a.com", record("old")).unwrap();
        store.upsert("a.com", record("new")).unwrap();

        assert_eq!(store.sites().unwrap(), vec!["a.com".to_string()]);
        assert_eq!(store.get("a.com").unwrap(), record("new"));
    }

    #[test]
    fn get_missing_site() {
        let (_dir, store) = store_with_vault();
        let err = store.get("nowhere.org").unwrap_err();
        assert!(matches!(err, VaultError::SiteNotFound(_)));
    }

    #[test]
    fn sites_are_sorted() {
        let (_dir, store) = store_with_vault();
        store.upsert("zeta.io", record("z")).unwrap();
        store.upsert("alpha.io", record("a")).unwrap();
        assert_eq!(store.sites().unwrap(), vec!["alpha.io", "zeta.io"]);
    }

    #[test]
    fn reserved_and_empty_sites_are_rejected() {
        assert!(validate_site("secret").is_err());
        assert!(validate_site("kdf").is_err());
        assert!(validate_site("").is_err());
        assert!(validate_site("   ").is_err());
        assert!(validate_site(&"x".repeat(257)).is_err());
        assert!(validate_site("example.com").is_ok());
    }
}
