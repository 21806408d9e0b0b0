//! Cryptographic operations for sealing and opening note envelopes

use aes_gcm::{
    aead::{consts::U16, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::errors::{EncryptionError, EncryptionResult};
use super::models::{
    Argon2Params, EncryptedEnvelope, KeySource, MasterKey, IV_SIZE, KEY_SIZE, TAG_SIZE,
};

/// AES-256-GCM with a 16-byte IV
type NoteCipher = AesGcm<Aes256, U16>;

/// Fixed application salt for passphrase stretching. Changing it makes
/// every passphrase-derived key unrecoverable.
const APP_KEY_SALT: &[u8] = b"studywell/note-envelope/master-key/v1";

/// Generate a random IV from the OS CSPRNG
pub fn generate_iv() -> EncryptionResult<[u8; IV_SIZE]> {
    let mut iv = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| EncryptionError::RandomSource(e.to_string()))?;
    Ok(iv)
}

fn cipher(key: &MasterKey) -> NoteCipher {
    NoteCipher::new(key.as_bytes().into())
}

/// Encrypt a note field under a fresh IV
pub fn seal(plaintext: &str, key: &MasterKey) -> EncryptionResult<EncryptedEnvelope> {
    seal_with_aad(plaintext, key, &[])
}

/// Decrypt an envelope produced by [`seal`]
pub fn open(envelope: &EncryptedEnvelope, key: &MasterKey) -> EncryptionResult<String> {
    open_with_aad(envelope, key, &[])
}

/// Encrypt and bind `aad` (e.g. the owning record ID) into the tag.
/// The same `aad` has to be presented to [`open_with_aad`].
pub fn seal_with_aad(
    plaintext: &str,
    key: &MasterKey,
    aad: &[u8],
) -> EncryptionResult<EncryptedEnvelope> {
    let iv = generate_iv()?;
    let mut buffer = plaintext.as_bytes().to_vec();

    let tag = cipher(key)
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), aad, &mut buffer)
        .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

    let mut auth_tag = [0u8; TAG_SIZE];
    auth_tag.copy_from_slice(tag.as_slice());

    Ok(EncryptedEnvelope {
        ciphertext: buffer,
        iv,
        auth_tag,
    })
}

/// Decrypt an envelope sealed with [`seal_with_aad`]
pub fn open_with_aad(
    envelope: &EncryptedEnvelope,
    key: &MasterKey,
    aad: &[u8],
) -> EncryptionResult<String> {
    let mut buffer = envelope.ciphertext.clone();

    cipher(key)
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(&envelope.iv),
            aad,
            &mut buffer,
            Tag::from_slice(&envelope.auth_tag),
        )
        .map_err(|_| EncryptionError::Integrity("authentication tag mismatch".to_string()))?;

    String::from_utf8(buffer).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        EncryptionError::Integrity("decrypted content is not valid UTF-8".to_string())
    })
}

/// Stretch a passphrase into a master key with Argon2id over the fixed
/// application salt. Deterministic for a given passphrase and params.
pub fn derive_key(passphrase: &str, params: &Argon2Params) -> EncryptionResult<MasterKey> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(passphrase.as_bytes(), APP_KEY_SALT, &mut key)
        .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;

    let master = MasterKey::new(key);
    key.zeroize();
    Ok(master)
}

/// Turn a configured key value into a master key.
///
/// A value that hex-decodes to exactly 32 bytes (surrounding whitespace
/// ignored) is used raw. Anything else is treated as a passphrase and is
/// stretched exactly as given.
pub fn resolve_master_key(
    value: &str,
    params: &Argon2Params,
) -> EncryptionResult<(MasterKey, KeySource)> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EncryptionError::Configuration(
            "master key is empty".to_string(),
        ));
    }

    if let Ok(mut bytes) = hex::decode(trimmed) {
        if bytes.len() == KEY_SIZE {
            let mut key = [0u8; KEY_SIZE];
            key.copy_from_slice(&bytes);
            bytes.zeroize();
            let master = MasterKey::new(key);
            key.zeroize();
            return Ok((master, KeySource::Raw));
        }
        bytes.zeroize();
    }

    Ok((derive_key(value, params)?, KeySource::Derived))
}

/// Short, non-reversible identifier for a key, safe to print in logs
pub fn key_fingerprint(key: &MasterKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"STUDYWELL_KEY_ID"); // Domain separation
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
