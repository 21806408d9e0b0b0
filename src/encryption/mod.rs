//! Encryption module for sensitive note fields
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with a 16-byte IV
//! - Envelopes stored as three hex columns (ciphertext, IV, tag)
//! - Argon2id stretching for passphrase-style master keys
//! - A process-wide master key resolved once at startup

pub mod crypto;
pub mod errors;
pub mod manager;
pub mod models;

// Re-export commonly used types
pub use crypto::{
    derive_key, generate_iv, key_fingerprint, open, open_with_aad, resolve_master_key, seal,
    seal_with_aad,
};
pub use errors::{EncryptionError, EncryptionResult};
pub use manager::{init_master_key, install_master_key, master_key, KeyManager, MASTER_KEY_ENV};
pub use models::{
    Argon2Params, EncryptedEnvelope, EnvelopeColumns, KeySource, MasterKey, IV_SIZE, KEY_SIZE,
    TAG_SIZE,
};
