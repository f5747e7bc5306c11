//! Stored login credentials
//!
//! The file format is `{"username": ..., "password": ...}` with the password
//! in plaintext, which is what existing installations already have on disk.
//! The file is created owner-readable only.

use serde::{Deserialize, Serialize};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Username and secret as stored locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(rename = "password")]
    pub secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The file exists but cannot be understood
    #[error("stored credentials are corrupt: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the Authenticator keeps credentials between runs
pub trait CredentialStore {
    /// `Ok(None)` when nothing is stored, `Err(Corrupt)` when the record is unusable.
    fn load(&self) -> Result<Option<Credentials>, CredentialError>;

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError>;

    /// Remove the stored record. Removing nothing is not an error.
    fn remove(&self) -> Result<(), CredentialError>;
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialError> {
        if !self.path.exists() {
            return Ok(None);
        }
        // Raw bytes, so invalid UTF-8 counts as corrupt rather than an IO failure.
        let content = std::fs::read(&self.path)?;
        let creds: Credentials = serde_json::from_slice(&content)
            .map_err(|e| CredentialError::Corrupt(e.to_string()))?;
        if creds.username.is_empty() {
            return Err(CredentialError::Corrupt("empty username".to_string()));
        }
        debug!("Loaded credentials for {} from {:?}", creds.username, self.path);
        Ok(Some(creds))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string(credentials)
            .map_err(|e| CredentialError::Corrupt(e.to_string()))?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        info!("Saved credentials for {} to {:?}", credentials.username, self.path);
        Ok(())
    }

    fn remove(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("login.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("login.json"));
        let creds = Credentials::new("alice", "s3cret");
        store.save(&creds).unwrap();
        assert_eq!(store.load().unwrap(), Some(creds));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"password\""));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login.json");
        std::fs::write(&path, "{\"username\": \"alice\"}").unwrap();
        let store = FileCredentialStore::new(&path);
        assert!(matches!(store.load(), Err(CredentialError::Corrupt(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(store.load(), Err(CredentialError::Corrupt(_))));
    }

    #[test]
    fn test_non_utf8_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
        let store = FileCredentialStore::new(&path);
        assert!(matches!(store.load(), Err(CredentialError::Corrupt(_))));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("login.json"));
        store.save(&Credentials::new("a", "b")).unwrap();
        store.remove().unwrap();
        store.remove().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("login.json"));
        store.save(&Credentials::new("a", "b")).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
