//! Symmetric encryption and `OAuth2` PKCE helpers.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use argon2::Argon2;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::CryptoError;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// AES-256-GCM encrypted payload, safe to persist and transmit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub version: u8,
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl EncryptedData {
    /// Current on-disk format version. Bumped if the encryption scheme changes.
    pub const CURRENT_VERSION: u8 = 1;

    pub fn new(nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>, tag: [u8; TAG_LEN]) -> Self {
        Self { version: Self::CURRENT_VERSION, nonce, ciphertext, tag }
    }
}

/// 256-bit AES-GCM key, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Wraps raw key bytes, e.g. loaded from a secrets manager.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Derives a key from a password and salt using Argon2id.
    pub fn derive_from_password(password: &str, salt: &[u8]) -> Result<Self, CryptoError> {
        let mut out = [0u8; KEY_LEN];
        Argon2::default()
            .hash_password_into(password.as_bytes(), salt, &mut out)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
        Ok(Self(out))
    }
}

/// Encrypts `plaintext` with a fresh random nonce.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<EncryptedData, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let mut sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;
    let tag_at = sealed.len().saturating_sub(TAG_LEN);
    let tag_bytes = sealed.split_off(tag_at);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);

    Ok(EncryptedData::new(nonce_bytes, sealed, tag))
}

/// Decrypts `data`, verifying its authentication tag.
pub fn decrypt(key: &EncryptionKey, data: &EncryptedData) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    let nonce = Nonce::from_slice(&data.nonce);

    let mut combined = Vec::with_capacity(data.ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(&data.ciphertext);
    combined.extend_from_slice(&data.tag);

    cipher
        .decrypt(nonce, combined.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Generates an `OAuth2` `state` parameter (URL-safe base64, 32 random bytes).
#[must_use]
pub fn generate_random_state() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64_url_encode(&bytes)
}

/// Generates a PKCE code verifier (URL-safe base64, 32 random bytes).
#[must_use]
pub fn generate_pkce_verifier() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64_url_encode(&bytes)
}

/// Derives the S256 PKCE code challenge for `verifier`.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    base64_url_encode(&hasher.finalize())
}

fn base64_url_encode(input: &[u8]) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = EncryptionKey::from_bytes([7u8; KEY_LEN]);
        let encrypted = encrypt(&key, b"hello").unwrap();
        assert_eq!(decrypt(&key, &encrypted).unwrap(), b"hello");
    }

    #[test]
    fn wrong_key_fails() {
        let key1 = EncryptionKey::from_bytes([1u8; KEY_LEN]);
        let key2 = EncryptionKey::from_bytes([2u8; KEY_LEN]);
        let encrypted = encrypt(&key1, b"hello").unwrap();
        assert!(matches!(decrypt(&key2, &encrypted), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn pkce_rfc7636_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            generate_code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }
}
