//! Vault Key
//!
//! The symmetric key lives next to the database as URL-safe base64 text.
//! It is generated on first run and never rotated.

use std::fs;
use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{info, instrument};
use zeroize::Zeroizing;

use crate::vault::error::{VaultError, VaultResult};

pub const KEY_SIZE: usize = 32;

/// 256-bit symmetric key, wiped from memory on drop
#[derive(Clone)]
pub struct SecretKey(Zeroizing<[u8; KEY_SIZE]>);

impl SecretKey {
    /// Generates a fresh key from the OS RNG
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
        OsRng.fill_bytes(&mut bytes[..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> VaultResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(VaultError::invalid_key(format!(
                "expected {} bytes, found {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Parses the on-disk text form
    pub fn decode(encoded: &str) -> VaultResult<Self> {
        let bytes = Zeroizing::new(
            URL_SAFE
                .decode(encoded.trim())
                .map_err(|e| VaultError::invalid_key(format!("not base64: {}", e)))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Returns the on-disk text form
    pub fn encode(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE.encode(&self.0[..]))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Loads the key at `path`, or generates and persists one if the file is absent
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_or_generate_key(path: &Path) -> VaultResult<SecretKey> {
    if path.exists() {
        let raw = Zeroizing::new(fs::read_to_string(path)?);
        return SecretKey::decode(&raw);
    }

    let key = SecretKey::generate();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    write_key_file(path, &key)?;
    info!("generated new vault key");

    Ok(key)
}

fn write_key_file(path: &Path, key: &SecretKey) -> VaultResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(key.encode().as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_creates_the_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secret.key");

        let key = load_or_generate_key(&path).unwrap();

        assert!(path.exists());
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, key.encode().as_str());
    }

    #[test]
    fn second_load_returns_the_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");

        let first = load_or_generate_key(&path).unwrap();
        let second = load_or_generate_key(&path).unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn trailing_newline_in_key_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");
        let key = SecretKey::generate();
        fs::write(&path, format!("{}\n", key.encode().as_str())).unwrap();

        let loaded = load_or_generate_key(&path).unwrap();
        assert_eq!(loaded.as_bytes(), key.as_bytes());
    }

    #[test]
    fn malformed_key_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");

        fs::write(&path, "not a key!").unwrap();
        assert!(matches!(
            load_or_generate_key(&path),
            Err(VaultError::InvalidKey(_))
        ));

        fs::write(&path, URL_SAFE.encode([7u8; 16])).unwrap();
        assert!(matches!(
            load_or_generate_key(&path),
            Err(VaultError::InvalidKey(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");
        load_or_generate_key(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn debug_output_hides_key_material() {
        let key = SecretKey::generate();
        assert_eq!(format!("{:?}", key), "SecretKey(..)");
    }
}
