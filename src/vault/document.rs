//! The JSON vault document and its on-disk persistence.
//!
//! A vault file looks like:
//!
//! ```text
//! {
//!   "secret": "<base64 verifier>",
//!   "kdf": { "salt": "<base64>", "memory_kib": 65536, "iterations": 1, "parallelism": 4 },
//!   "<site>": { "username": "<base64 blob>", "password": "<base64 blob>" },
//!   ...
//! }
//! ```
//!
//! Every key other than `secret` and `kdf` is a site label.  The whole file
//! is always read and rewritten in one piece.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::record::CredentialRecord;
use crate::crypto::KdfParams;
use crate::errors::{Result, VaultError};

/// Top-level key holding the encoded verifier.
pub const SECRET_KEY: &str = "secret";

/// Top-level key holding the key-derivation header.
pub const KDF_KEY: &str = "kdf";

/// Keys that can never be used as site labels.
pub const RESERVED_KEYS: [&str; 2] = [SECRET_KEY, KDF_KEY];

/// Salt and Argon2 parameters used when the vault was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfHeader {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl KdfHeader {
    pub fn new(salt: &[u8], params: &KdfParams) -> Self {
        Self {
            salt: salt.to_vec(),
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }

    pub fn params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

/// In-memory form of the whole vault file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfHeader>,

    /// Site label -> encrypted credentials.
    #[serde(flatten)]
    pub records: BTreeMap<String, CredentialRecord>,
}

/// Read the vault document at `path`.
///
/// A missing or empty file means "no vault yet" and yields `None`.  Any
/// other read or parse failure is a storage error.
pub fn read_document(path: &Path) -> Result<Option<VaultDocument>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no vault file");
            return Ok(None);
        }
        Err(e) => return Err(VaultError::storage(path, format!("cannot read vault: {e}"))),
    };

    if data.iter().all(u8::is_ascii_whitespace) {
        tracing::debug!(path = %path.display(), "vault file is empty");
        return Ok(None);
    }

    let document = serde_json::from_slice(&data)
        .map_err(|e| VaultError::storage(path, format!("invalid vault JSON: {e}")))?;
    Ok(Some(document))
}

/// Write `document` to `path` **atomically** with owner-only permissions.
///
/// The JSON goes to a temp file in the same directory, which is then
/// renamed over the target so readers never see a half-written vault.
pub fn write_document(path: &Path, document: &VaultDocument) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(document)
        .map_err(|e| VaultError::SerializationError(format!("vault document: {e}")))?;
    json.push(b'\n');

    let tmp_path = temp_path(path);
    write_private(&tmp_path, &json)
        .map_err(|e| VaultError::storage(&tmp_path, format!("cannot write vault: {e}")))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(VaultError::storage(path, format!("cannot replace vault: {e}")));
    }

    tracing::debug!(path = %path.display(), sites = document.records.len(), "vault written");
    Ok(())
}

/// Sibling temp file used by `write_document`: `<dir>/.<name>.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a stale temp file too.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> VaultDocument {
        let mut doc = VaultDocument {
            secret: Some("c2VjcmV0".into()),
            kdf: Some(KdfHeader::new(&[9u8; 16], &KdfParams::default())),
            records: BTreeMap::new(),
        };
        doc.records.insert(
            "example.com".into(),
            CredentialRecord {
                username: "dXNlcg==".into(),
                password: "cGFzcw==".into(),
            },
        );
        doc
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let doc = read_document(&dir.path().join("vault.json")).unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn empty_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, "  \n").unwrap();
        assert!(read_document(&path).unwrap().is_none());
    }

    #[test]
    fn invalid_json_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, VaultError::Storage { .. }));
    }

    #[test]
    fn site_entries_sit_next_to_secret_at_top_level() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["secret"], "c2VjcmV0");
        assert!(obj["kdf"]["salt"].is_string());
        assert_eq!(obj["example.com"]["username"], "dXNlcg==");
        assert_eq!(obj["example.com"]["password"], "cGFzcw==");
    }

    #[test]
    fn write_then_read_preserves_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.json");
        write_document(&path, &sample()).unwrap();

        let doc = read_document(&path).unwrap().unwrap();
        assert_eq!(doc.secret.as_deref(), Some("c2VjcmV0"));
        assert_eq!(doc.kdf.unwrap().salt, vec![9u8; 16]);
        assert!(doc.records.contains_key("example.com"));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn document_with_only_secret_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, r#"{"secret":"YWJj"}"#).unwrap();

        let doc = read_document(&path).unwrap().unwrap();
        assert_eq!(doc.secret.as_deref(), Some("YWJj"));
        assert!(doc.kdf.is_none());
        assert!(doc.records.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.json");
        write_document(&path, &sample()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn temp_path_is_a_hidden_sibling() {
        let path = Path::new("/tmp/x/vault.json");
        assert_eq!(temp_path(path), PathBuf::from("/tmp/x/.vault.json.tmp"));
    }
}
