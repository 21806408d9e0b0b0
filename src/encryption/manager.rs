//! Process-wide master key handling
//!
//! The master key is resolved once, at startup, from `STUDYWELL_MASTER_KEY`
//! and is immutable afterwards. Rotating it means restarting the process.

use std::env::{self, VarError};
use std::sync::OnceLock;

use super::crypto::{
    key_fingerprint, open, open_with_aad, resolve_master_key, seal, seal_with_aad,
};
use super::errors::{EncryptionError, EncryptionResult};
use super::models::{Argon2Params, EncryptedEnvelope, KeySource, MasterKey};

/// Environment variable holding the master key (hex) or passphrase
pub const MASTER_KEY_ENV: &str = "STUDYWELL_MASTER_KEY";

static GLOBAL: OnceLock<KeyManager> = OnceLock::new();

/// Owns the resolved master key and seals/opens envelopes with it
pub struct KeyManager {
    key: MasterKey,
    source: KeySource,
}

impl KeyManager {
    pub fn new(key: MasterKey, source: KeySource) -> Self {
        Self { key, source }
    }

    /// Resolve from a configured value; `None` means nothing was configured
    pub fn from_value(value: Option<&str>) -> EncryptionResult<Self> {
        Self::from_value_with_params(value, &Argon2Params::default())
    }

    pub fn from_value_with_params(
        value: Option<&str>,
        params: &Argon2Params,
    ) -> EncryptionResult<Self> {
        let value = value.ok_or_else(|| {
            EncryptionError::Configuration(format!("{} is not set", MASTER_KEY_ENV))
        })?;

        let (key, source) = resolve_master_key(value, params)?;
        let manager = Self::new(key, source);
        log::info!(
            "Resolved note master key ({:?}, id {})",
            manager.source,
            manager.fingerprint()
        );
        Ok(manager)
    }

    /// Resolve from the process environment
    pub fn from_env() -> EncryptionResult<Self> {
        let value = read_key_var(env::var(MASTER_KEY_ENV))?;
        Self::from_value(value.as_deref())
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }

    pub fn seal(&self, plaintext: &str) -> EncryptionResult<EncryptedEnvelope> {
        seal(plaintext, &self.key)
    }

    pub fn open(&self, envelope: &EncryptedEnvelope) -> EncryptionResult<String> {
        open(envelope, &self.key)
    }

    pub fn seal_bound(&self, plaintext: &str, aad: &[u8]) -> EncryptionResult<EncryptedEnvelope> {
        seal_with_aad(plaintext, &self.key, aad)
    }

    pub fn open_bound(&self, envelope: &EncryptedEnvelope, aad: &[u8]) -> EncryptionResult<String> {
        open_with_aad(envelope, &self.key, aad)
    }
}

fn read_key_var(var: Result<String, VarError>) -> EncryptionResult<Option<String>> {
    match var {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(EncryptionError::Configuration(format!(
            "{} is not valid UTF-8",
            MASTER_KEY_ENV
        ))),
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("key", &self.key)
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve the master key from the environment and install it for the
/// rest of the process. Call this at startup so a missing key stops the
/// process before any note is touched.
pub fn init_master_key() -> EncryptionResult<&'static KeyManager> {
    if let Some(manager) = GLOBAL.get() {
        return Ok(manager);
    }
    let manager = KeyManager::from_env()?;
    Ok(GLOBAL.get_or_init(|| manager))
}

/// Install an already resolved manager. Returns the one in place if the
/// key was already initialised.
pub fn install_master_key(manager: KeyManager) -> &'static KeyManager {
    GLOBAL.get_or_init(|| manager)
}

/// The process master key, if [`init_master_key`] succeeded
pub fn master_key() -> EncryptionResult<&'static KeyManager> {
    GLOBAL.get().ok_or_else(|| {
        EncryptionError::Configuration("master key has not been initialised".to_string())
    })
}
