//! Password Cipher
//!
//! AES-256-GCM with a fresh random nonce per value. The stored token is
//! `base64url(nonce || ciphertext || tag)`, so each row is self-contained.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::vault::error::{VaultError, VaultResult};
use crate::vault::key::SecretKey;

const NONCE_SIZE: usize = 12;

/// Encrypts and decrypts passwords with the vault key
pub struct Cipher {
    aead: Aes256Gcm,
}

impl Cipher {
    pub fn new(key: &SecretKey) -> Self {
        Self {
            aead: Aes256Gcm::new_from_slice(key.as_bytes())
                .expect("SecretKey is always 32 bytes"),
        }
    }

    /// Encrypts `plaintext` into a printable token
    pub fn encrypt(&self, plaintext: &str) -> VaultResult<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| VaultError::Encryption(e.to_string()))?;

        let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);

        Ok(URL_SAFE.encode(token))
    }

    /// Decrypts a token produced by [`Cipher::encrypt`].
    ///
    /// Every failure collapses into [`VaultError::Decryption`]; a token sealed
    /// under another key never yields plaintext.
    pub fn decrypt(&self, token: &str) -> VaultResult<String> {
        let raw = URL_SAFE
            .decode(token.trim())
            .map_err(|_| VaultError::Decryption)?;
        if raw.len() < NONCE_SIZE {
            return Err(VaultError::Decryption);
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| VaultError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| VaultError::Decryption)
    }
}
