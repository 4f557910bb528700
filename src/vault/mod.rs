//! Vault Module
//!
//! Encrypted password storage backed by a local key file and SQLite.

pub mod cipher;
pub mod credentials;
pub mod error;
pub mod key;
pub mod lookup;
pub mod manager;
pub mod storage;

pub use credentials::{NewCredential, RevealedCredential, StoredCredential};
pub use error::{VaultError, VaultResult};
pub use manager::{PasswordVault, RetrieveQuery, Retrieval, SaveOutcome};
pub use storage::VaultStorage;
