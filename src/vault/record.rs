//! Encrypted credential records.
//!
//! Each field of a record is sealed on its own and wrapped, with its nonce
//! and the field name, into a small JSON blob:
//!
//! ```text
//! {"field":"username","nonce":"<base64>","ciphertext":"<base64>"}
//! ```
//!
//! The record stores each blob base64-encoded, so the vault file stays
//! plain JSON strings all the way down.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::document::{base64_decode, base64_encode};
use crate::crypto::CipherSession;
use crate::errors::{Result, VaultError};

/// Field label of the username blob.
pub const USERNAME_FIELD: &str = "username";

/// Field label of the password blob.
pub const PASSWORD_FIELD: &str = "password";

/// The encrypted credentials stored for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Base64 of the sealed username blob.
    pub username: String,
    /// Base64 of the sealed password blob.
    pub password: String,
}

/// One sealed field, as serialized inside a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedField {
    pub field: String,
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,
}

/// Decrypted credentials for one site.
pub struct Credential {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Seal `value` and serialize it, tagged with `label`, into JSON bytes.
pub fn encrypt_field(session: &CipherSession, label: &str, value: &[u8]) -> Result<Vec<u8>> {
    let sealed = session.seal(value)?;
    let field = EncryptedField {
        field: label.to_string(),
        nonce: sealed.nonce,
        ciphertext: sealed.ciphertext,
    };
    serde_json::to_vec(&field)
        .map_err(|e| VaultError::SerializationError(format!("{label} field: {e}")))
}

/// Parse a blob produced by `encrypt_field` and open it.
///
/// The blob must carry the expected `label`; a blob moved from another
/// field is rejected like a tampered one.
pub fn decrypt_field(
    session: &CipherSession,
    label: &str,
    encoded: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let field: EncryptedField =
        serde_json::from_slice(encoded).map_err(|_| VaultError::DecryptionFailed)?;

    if field.field != label {
        tracing::warn!(expected = label, found = %field.field, "field label mismatch");
        return Err(VaultError::DecryptionFailed);
    }

    let plaintext = session.open(&field.ciphertext, &field.nonce)?;
    Ok(Zeroizing::new(plaintext))
}

impl CredentialRecord {
    /// Encrypt both fields under `session`.
    pub fn seal(session: &CipherSession, username: &str, password: &str) -> Result<Self> {
        let username = encrypt_field(session, USERNAME_FIELD, username.as_bytes())?;
        let password = encrypt_field(session, PASSWORD_FIELD, password.as_bytes())?;
        Ok(Self {
            username: BASE64.encode(username),
            password: BASE64.encode(password),
        })
    }

    /// Decrypt both fields under `session`.
    pub fn open(&self, session: &CipherSession) -> Result<Credential> {
        let username = open_encoded(session, USERNAME_FIELD, &self.username)?;
        let password = open_encoded(session, PASSWORD_FIELD, &self.password)?;

        Ok(Credential {
            username: into_string(username)?,
            password: Zeroizing::new(into_string(password)?),
        })
    }
}

/// Decode the base64 wrapper of a stored field and decrypt it.
pub fn open_encoded(session: &CipherSession, label: &str, encoded: &str) -> Result<Zeroizing<Vec<u8>>> {
    let blob = BASE64
        .decode(encoded)
        .map_err(|_| VaultError::DecryptionFailed)?;
    decrypt_field(session, label, &blob)
}

fn into_string(mut bytes: Zeroizing<Vec<u8>>) -> Result<String> {
    let owned = std::mem::take(&mut *bytes);
    String::from_utf8(owned).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        VaultError::SerializationError("credential field is not valid UTF-8".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CipherSession {
        CipherSession::new(&[0x42u8; 32]).unwrap()
    }

    #[test]
    fn field_blob_carries_label_and_nonce() {
        let blob = encrypt_field(&session(), USERNAME_FIELD, b"alice").unwrap();
        let field: EncryptedField = serde_json::from_slice(&blob).unwrap();
        assert_eq!(field.field, "username");
        assert_eq!(field.nonce.len(), 12);
        assert!(!blob.windows(5).any(|w| w == b"alice"));
    }

    #[test]
    fn decrypt_field_recovers_value() {
        let s = session();
        let blob = encrypt_field(&s, PASSWORD_FIELD, b"pw123").unwrap();
        let plain = decrypt_field(&s, PASSWORD_FIELD, &blob).unwrap();
        assert_eq!(plain.as_slice(), b"pw123");
    }

    #[test]
    fn swapped_label_is_rejected() {
        let s = session();
        let blob = encrypt_field(&s, USERNAME_FIELD, b"alice").unwrap();
        let err = decrypt_field(&s, PASSWORD_FIELD, &blob).unwrap_err();
        assert!(matches!(err, VaultError::DecryptionFailed));
    }

    #[test]
    fn record_round_trip_under_same_session() {
        let s = session();
        let record = CredentialRecord::seal(&s, "alice", "pw123").unwrap();
        let cred = record.open(&s).unwrap();
        assert_eq!(cred.username, "alice");
        assert_eq!(cred.password.as_str(), "pw123");
    }

    #[test]
    fn record_does_not_open_under_other_key() {
        let record = CredentialRecord::seal(&session(), "alice", "pw123").unwrap();
        let other = CipherSession::new(&[0x43u8; 32]).unwrap();
        let err = record.open(&other).unwrap_err();
        assert!(matches!(err, VaultError::DecryptionFailed));
    }

    #[test]
    fn garbage_encoding_fails_closed() {
        let err = open_encoded(&session(), USERNAME_FIELD, "%%%").unwrap_err();
        assert!(matches!(err, VaultError::DecryptionFailed));
    }

    #[test]
    fn credential_debug_hides_password() {
        let cred = Credential {
            username: "alice".into(),
            password: Zeroizing::new("pw123".into()),
        };
        let shown = format!("{cred:?}");
        assert!(shown.contains("alice"));
        assert!(!shown.contains("pw123"));
    }
}
