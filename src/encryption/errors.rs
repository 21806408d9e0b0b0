//! Encryption error types

use thiserror::Error;

/// Errors that can occur during encryption operations
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The master key is missing or unusable. Fatal at startup.
    #[error("Encryption is misconfigured: {0}")]
    Configuration(String),

    /// The envelope did not authenticate. Covers tampering, a wrong key,
    /// corrupted columns and fields mixed up between envelopes.
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Random source failure: {0}")]
    RandomSource(String),
}

impl EncryptionError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type alias for encryption operations
pub type EncryptionResult<T> = Result<T, EncryptionError>;
