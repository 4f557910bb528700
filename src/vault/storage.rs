//! Vault Storage
//!
//! SQLite persistence for credentials. Uniqueness of (service, username) is
//! the caller's job: look up with [`VaultStorage::find_id`] before inserting.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use tracing::instrument;

use crate::vault::credentials::StoredCredential;
use crate::vault::error::VaultResult;

pub type SqlitePool = Pool<Sqlite>;

/// Table DDL. No UNIQUE constraint on (service, username).
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS passwords (
    id INTEGER PRIMARY KEY,
    service TEXT,
    username TEXT,
    password TEXT
)
"#;

/// Storage for encrypted credentials
#[derive(Clone)]
pub struct VaultStorage {
    pool: SqlitePool,
}

impl VaultStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `path` and ensures the schema
    pub async fn open(path: &Path) -> VaultResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        // Single user, single writer.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub async fn init_schema(&self) -> VaultResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the id of the row holding exactly this service and username
    pub async fn find_id(&self, service: &str, username: &str) -> VaultResult<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM passwords WHERE service = ? AND username = ?")
                .bind(service)
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    /// Inserts a new row and returns its id
    #[instrument(skip(self, ciphertext))]
    pub async fn insert(&self, service: &str, username: &str, ciphertext: &str) -> VaultResult<i64> {
        let result =
            sqlx::query("INSERT INTO passwords (service, username, password) VALUES (?, ?, ?)")
                .bind(service)
                .bind(username)
                .bind(ciphertext)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Replaces the password of an existing row. Returns false if no row has `id`.
    #[instrument(skip(self, ciphertext))]
    pub async fn update_password(&self, id: i64, ciphertext: &str) -> VaultResult<bool> {
        let result = sqlx::query("UPDATE passwords SET password = ? WHERE id = ?")
            .bind(ciphertext)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All rows whose service or username equals `text`, oldest first
    pub async fn find_matching(&self, text: &str) -> VaultResult<Vec<StoredCredential>> {
        let rows = sqlx::query(
            r#"SELECT id, service, username, password
               FROM passwords WHERE service = ? OR username = ? ORDER BY id"#,
        )
        .bind(text)
        .bind(text)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_model).collect()
    }

    pub async fn count(&self) -> VaultResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM passwords")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    fn row_to_model(row: &SqliteRow) -> VaultResult<StoredCredential> {
        // Columns are nullable in the schema; treat NULL as empty text.
        Ok(StoredCredential {
            id: row.try_get("id")?,
            service: row.try_get::<Option<String>, _>("service")?.unwrap_or_default(),
            username: row.try_get::<Option<String>, _>("username")?.unwrap_or_default(),
            password_ciphertext: row
                .try_get::<Option<String>, _>("password")?
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_storage() -> (tempfile::TempDir, VaultStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = VaultStorage::open(&dir.path().join("passwords.db"))
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn open_creates_the_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.db");

        let storage = VaultStorage::open(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let (_dir, storage) = temp_storage().await;
        storage.insert("mail", "alice", "ct").await.unwrap();

        storage.init_schema().await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn find_id_matches_both_columns_exactly() {
        let (_dir, storage) = temp_storage().await;
        let id = storage.insert("mail", "alice", "ct").await.unwrap();

        assert_eq!(storage.find_id("mail", "alice").await.unwrap(), Some(id));
        assert_eq!(storage.find_id("mail", "bob").await.unwrap(), None);
        assert_eq!(storage.find_id("Mail", "alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_password_mutates_in_place() {
        let (_dir, storage) = temp_storage().await;
        let id = storage.insert("mail", "alice", "old").await.unwrap();

        assert!(storage.update_password(id, "new").await.unwrap());
        assert!(!storage.update_password(id + 100, "new").await.unwrap());

        let rows = storage.find_matching("mail").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].password_ciphertext, "new");
    }

    #[tokio::test]
    async fn find_matching_checks_service_or_username() {
        let (_dir, storage) = temp_storage().await;
        storage.insert("mail", "alice", "1").await.unwrap();
        storage.insert("bank", "alice", "2").await.unwrap();
        storage.insert("alice", "root", "3").await.unwrap();
        storage.insert("shop", "bob", "4").await.unwrap();

        let rows = storage.find_matching("alice").await.unwrap();
        let tokens: Vec<_> = rows.iter().map(|r| r.password_ciphertext.as_str()).collect();
        assert_eq!(tokens, vec!["1", "2", "3"]);

        assert!(storage.find_matching("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn data_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.db");

        {
            let storage = VaultStorage::open(&path).await.unwrap();
            storage.insert("mail", "alice", "ct").await.unwrap();
            storage.pool().close().await;
        }

        let storage = VaultStorage::open(&path).await.unwrap();
        assert_eq!(storage.find_matching("mail").await.unwrap().len(), 1);
    }
}
