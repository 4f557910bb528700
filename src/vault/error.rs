//! Vault errors
//!
//! Every failure the vault can report. Messages are what the GUI shows in its
//! error dialog, so they stay short and never carry secret material.

use thiserror::Error;

/// Errors raised by the vault layer
#[derive(Debug, Error)]
pub enum VaultError {
    /// A required form field was left empty
    #[error("{0}")]
    MissingInput(String),

    /// Lookup found nothing for the given text
    #[error("{0}")]
    NotFound(String),

    /// Stored ciphertext could not be decrypted with the current key
    #[error("Failed to decrypt password.")]
    Decryption,

    #[error("Failed to encrypt password: {0}")]
    Encryption(String),

    /// Key file exists but does not hold a usable key
    #[error("Invalid key file: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
