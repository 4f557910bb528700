//! Credential records
//!
//! A stored row keeps the password as ciphertext; it is only turned into a
//! [`RevealedCredential`] at the moment a lookup resolves to it.

use serde::Serialize;

/// A row of the `passwords` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Surrogate key assigned by SQLite
    pub id: i64,
    pub service: String,
    pub username: String,
    /// Encrypted password token
    pub password_ciphertext: String,
}

/// A decrypted service/username/password triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealedCredential {
    pub service: String,
    pub username: String,
    pub password: String,
}

/// Form input for saving a credential
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub service: String,
    pub username: String,
    pub password: String,
}

impl NewCredential {
    pub fn new(
        service: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// True when every field has been filled in
    pub fn is_complete(&self) -> bool {
        !self.service.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}
