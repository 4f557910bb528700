//! Password Vault
//!
//! Ties key, cipher and storage together into the two flows the form offers:
//! save-or-update and retrieve.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::VaultConfig;
use crate::vault::cipher::Cipher;
use crate::vault::credentials::{NewCredential, RevealedCredential, StoredCredential};
use crate::vault::error::{VaultError, VaultResult};
use crate::vault::key::{load_or_generate_key, SecretKey};
use crate::vault::lookup::{self, Resolution};
use crate::vault::storage::VaultStorage;

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required.";
pub const LOOKUP_REQUIRED: &str = "Service/Username field is required.";
pub const LOOKUP_NOT_FOUND: &str = "Service/Username not found or decryption failed.";

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// A new row was written
    Saved,
    /// The pair already exists and nothing was written; ask before overwriting
    AlreadyExists,
    /// The existing row got the new password
    Updated,
}

/// A retrieve request plus the prompt answers collected so far
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieveQuery {
    pub text: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl RetrieveQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Result of a retrieve request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Retrieval {
    Found { credential: RevealedCredential },
    NeedService { query: String, services: Vec<String> },
    NeedUsername { service: String, usernames: Vec<String> },
    Cancelled,
}

/// The encrypted password store
pub struct PasswordVault {
    cipher: Cipher,
    storage: VaultStorage,
}

impl PasswordVault {
    pub fn new(key: &SecretKey, storage: VaultStorage) -> Self {
        Self {
            cipher: Cipher::new(key),
            storage,
        }
    }

    /// Loads (or creates) the key file and database named by `config`
    #[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
    pub async fn open(config: &VaultConfig) -> VaultResult<Self> {
        let key = load_or_generate_key(&config.key_path())?;
        let storage = VaultStorage::open(&config.database_path()).await?;
        info!("vault opened");
        Ok(Self::new(&key, storage))
    }

    pub fn storage(&self) -> &VaultStorage {
        &self.storage
    }

    /// Saves a credential, or updates the password of an existing
    /// (service, username) pair when `overwrite` is set.
    #[instrument(skip(self, input), fields(service = %input.service, username = %input.username))]
    pub async fn save(&self, input: &NewCredential, overwrite: bool) -> VaultResult<SaveOutcome> {
        if !input.is_complete() {
            return Err(VaultError::missing_input(ALL_FIELDS_REQUIRED));
        }

        let ciphertext = self.cipher.encrypt(&input.password)?;

        match self.storage.find_id(&input.service, &input.username).await? {
            None => {
                let id = self
                    .storage
                    .insert(&input.service, &input.username, &ciphertext)
                    .await?;
                info!(id, "credential saved");
                Ok(SaveOutcome::Saved)
            }
            Some(id) if overwrite => {
                self.storage.update_password(id, &ciphertext).await?;
                info!(id, "credential updated");
                Ok(SaveOutcome::Updated)
            }
            Some(id) => {
                debug!(id, "credential exists, awaiting confirmation");
                Ok(SaveOutcome::AlreadyExists)
            }
        }
    }

    /// Looks up a credential by service or username, asking for more detail
    /// when the text matches several rows.
    #[instrument(skip(self, query), fields(text = %query.text))]
    pub async fn retrieve(&self, query: &RetrieveQuery) -> VaultResult<Retrieval> {
        if query.text.is_empty() {
            return Err(VaultError::missing_input(LOOKUP_REQUIRED));
        }

        let rows = self.storage.find_matching(&query.text).await?;
        debug!(matches = rows.len(), "lookup");

        match lookup::resolve(rows, query.service.as_deref(), query.username.as_deref())? {
            Resolution::Found(row) => Ok(Retrieval::Found {
                credential: self.reveal(row)?,
            }),
            Resolution::NotFound => Err(VaultError::not_found(LOOKUP_NOT_FOUND)),
            Resolution::NeedService { services } => Ok(Retrieval::NeedService {
                query: query.text.clone(),
                services,
            }),
            Resolution::NeedUsername { service, usernames } => {
                Ok(Retrieval::NeedUsername { service, usernames })
            }
            Resolution::Cancelled => Ok(Retrieval::Cancelled),
        }
    }

    fn reveal(&self, row: StoredCredential) -> VaultResult<RevealedCredential> {
        let password = self
            .cipher
            .decrypt(&row.password_ciphertext)
            .inspect_err(|_| warn!(id = row.id, "stored password could not be decrypted"))?;

        Ok(RevealedCredential {
            service: row.service,
            username: row.username,
            password,
        })
    }
}
