//! Vault configuration.
//!
//! Defaults keep the key and database in the working directory. An optional
//! `passkeep.json` in the data directory can rename the files or change the
//! search delay. `PASSKEEP_DATA_DIR` picks the data directory and
//! `PASSKEEP_SEARCH_DELAY_MS` overrides the file's delay.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::vault::error::{VaultError, VaultResult};

const CONFIG_FILE: &str = "passkeep.json";
const DATA_DIR_ENV: &str = "PASSKEEP_DATA_DIR";
const SEARCH_DELAY_ENV: &str = "PASSKEEP_SEARCH_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VaultConfig {
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(default = "default_key_file")]
    pub key_file: String,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// Pause before a retrieve reads the database, while the GUI shows its
    /// searching indicator
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,
}

fn default_key_file() -> String {
    "secret.key".to_string()
}

fn default_database_file() -> String {
    "passwords.db".to_string()
}

fn default_search_delay_ms() -> u64 {
    2000
}

fn env_u64_opt(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
}

fn load_from_file(path: &Path) -> VaultResult<Option<VaultConfig>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| VaultError::config(format!("{}: {}", path.display(), e)))
}

impl VaultConfig {
    /// Defaults rooted at `data_dir`, ignoring files and environment
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            key_file: default_key_file(),
            database_file: default_database_file(),
            search_delay_ms: default_search_delay_ms(),
        }
    }

    /// Resolves the effective configuration: defaults, then the config file in
    /// the data directory, then environment overrides.
    pub fn load() -> VaultResult<Self> {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::load_from_dir(&data_dir)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus the optional config file in `data_dir`
    pub fn load_from_dir(data_dir: &Path) -> VaultResult<Self> {
        let mut config = load_from_file(&data_dir.join(CONFIG_FILE))?
            .unwrap_or_else(|| Self::in_dir(data_dir));
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = env_u64_opt(SEARCH_DELAY_ENV) {
            self.search_delay_ms = value;
        }
    }

    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join(&self.key_file)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn search_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_delay_ms)
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_file_names() {
        let config = VaultConfig::in_dir("/data");
        assert_eq!(config.key_path(), PathBuf::from("/data/secret.key"));
        assert_eq!(config.database_path(), PathBuf::from("/data/passwords.db"));
        assert_eq!(config.search_delay_ms, 2000);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VaultConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config, VaultConfig::in_dir(dir.path()));
    }

    #[test]
    fn config_file_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "database_file": "vault.sqlite", "search_delay_ms": 0 }"#,
        )
        .unwrap();

        let config = VaultConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.key_file, "secret.key");
        assert_eq!(config.database_file, "vault.sqlite");
        assert_eq!(config.search_delay_ms, 0);
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn environment_overrides_data_dir_and_delay() {
        // The only test touching these variables, so no other test races it.
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "search_delay_ms": 300 }"#).unwrap();
        std::env::set_var(DATA_DIR_ENV, dir.path());

        std::env::set_var(SEARCH_DELAY_ENV, "7");
        let config = VaultConfig::load().unwrap();
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.search_delay_ms, 7);
        assert_eq!(config.database_path(), dir.path().join("passwords.db"));

        std::env::set_var(SEARCH_DELAY_ENV, "soon");
        assert_eq!(VaultConfig::load().unwrap().search_delay_ms, 300);

        std::env::remove_var(SEARCH_DELAY_ENV);
        assert_eq!(VaultConfig::load().unwrap().search_delay_ms, 300);

        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn malformed_config_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ nope").unwrap();

        assert!(matches!(
            VaultConfig::load_from_dir(dir.path()),
            Err(VaultError::Config(_))
        ));
    }
}
