//! Encryption data models

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::{EncryptionError, EncryptionResult};

/// IV (nonce) size in bytes
pub const IV_SIZE: usize = 16;

/// GCM authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// Master key size in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// One encrypted field at rest.
///
/// The three parts are stored as separate hex columns and must always be
/// written and read together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    #[serde(with = "hex")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "hex")]
    pub iv: [u8; IV_SIZE],
    #[serde(with = "hex")]
    pub auth_tag: [u8; TAG_SIZE],
}

/// Hex columns as handed to the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeColumns {
    pub ciphertext: String,
    pub iv: String,
    pub auth_tag: String,
}

impl EncryptedEnvelope {
    pub fn to_columns(&self) -> EnvelopeColumns {
        EnvelopeColumns {
            ciphertext: hex::encode(&self.ciphertext),
            iv: hex::encode(self.iv),
            auth_tag: hex::encode(self.auth_tag),
        }
    }

    /// Rebuild an envelope from stored columns.
    ///
    /// Malformed columns are an integrity failure: they can only come from
    /// corrupted storage or a mixed-up row.
    pub fn from_columns(ciphertext: &str, iv: &str, auth_tag: &str) -> EncryptionResult<Self> {
        let ciphertext = hex::decode(ciphertext)
            .map_err(|e| EncryptionError::Integrity(format!("ciphertext column: {}", e)))?;
        let iv = decode_fixed::<IV_SIZE>("iv", iv)?;
        let auth_tag = decode_fixed::<TAG_SIZE>("auth tag", auth_tag)?;

        Ok(Self {
            ciphertext,
            iv,
            auth_tag,
        })
    }
}

impl TryFrom<&EnvelopeColumns> for EncryptedEnvelope {
    type Error = EncryptionError;

    fn try_from(columns: &EnvelopeColumns) -> EncryptionResult<Self> {
        Self::from_columns(&columns.ciphertext, &columns.iv, &columns.auth_tag)
    }
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> EncryptionResult<[u8; N]> {
    let bytes = hex::decode(value)
        .map_err(|e| EncryptionError::Integrity(format!("{} column: {}", field, e)))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        EncryptionError::Integrity(format!(
            "{} column: expected {} bytes, got {}",
            field,
            N,
            bytes.len()
        ))
    })
}

/// Where the process master key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// 64 hex characters, used as-is
    Raw,
    /// A passphrase stretched with Argon2id
    Derived,
}

/// Master key with secure memory handling
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_SIZE],
}

impl MasterKey {
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Argon2id parameters for passphrase stretching.
///
/// Changing these changes every derived key, so production always uses
/// the defaults.
#[derive(Debug, Clone)]
pub struct Argon2Params {
    /// Memory cost in KiB (65536 = 64MB)
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedEnvelope {
        EncryptedEnvelope {
            ciphertext: vec![0xde, 0xad, 0xbe, 0xef],
            iv: [7u8; IV_SIZE],
            auth_tag: [9u8; TAG_SIZE],
        }
    }

    #[test]
    fn test_columns_are_hex() {
        let columns = sample().to_columns();
        assert_eq!(columns.ciphertext, "deadbeef");
        assert_eq!(columns.iv, "07".repeat(IV_SIZE));
        assert_eq!(columns.auth_tag, "09".repeat(TAG_SIZE));

        let back = EncryptedEnvelope::try_from(&columns).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_malformed_columns_are_integrity_errors() {
        let columns = sample().to_columns();

        let bad_hex = EncryptedEnvelope::from_columns("zz", &columns.iv, &columns.auth_tag);
        assert!(bad_hex.unwrap_err().is_integrity());

        let short_iv =
            EncryptedEnvelope::from_columns(&columns.ciphertext, "0011", &columns.auth_tag);
        assert!(short_iv.unwrap_err().is_integrity());

        // a column copied from another field has the wrong length
        let long_tag =
            EncryptedEnvelope::from_columns(&columns.ciphertext, &columns.iv, &columns.ciphertext);
        assert!(long_tag.unwrap_err().is_integrity());
    }

    #[test]
    fn test_serde_uses_hex_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["ciphertext"], "deadbeef");
        assert!(json["authTag"].is_string());

        let back: EncryptedEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_master_key_debug_is_redacted() {
        let key = MasterKey::new([0x42; KEY_SIZE]);
        let printed = format!("{:?}", key);
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("42"));
    }
}
