//! JSON file storage for credentials.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use tether_core::error::{Error, StorageError};
use tether_core::{AccessToken, CredentialPair, CredentialStore, RefreshToken, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn map_io(err: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        message: err.to_string(),
    })
}

/// On-disk form of a credential pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the pair was last written.
    pub updated_at: DateTime<Utc>,
}

impl StoredCredentials {
    fn from_pair(pair: &CredentialPair) -> Self {
        Self {
            access_token: pair.access_token.as_str().to_string(),
            refresh_token: pair.refresh_token.as_ref().map(|t| t.as_str().to_string()),
            updated_at: Utc::now(),
        }
    }

    fn into_pair(self) -> CredentialPair {
        CredentialPair {
            access_token: AccessToken::new(self.access_token),
            refresh_token: self.refresh_token.map(RefreshToken::new),
        }
    }
}

/// Credential store backed by a JSON file.
///
/// Writes go to a temporary sibling that is renamed into place, so readers
/// never observe a half-written file. A sibling `.lock` file serializes
/// access between processes. On Unix the file is created with mode `0600`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store at the given file path. Nothing is touched on disk
    /// until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the credentials file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record, including its timestamp.
    pub fn load(&self) -> Result<Option<StoredCredentials>> {
        let _lock = self.lock(false)?;
        self.read_unlocked()
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(map_io)?;
        }
        Ok(())
    }

    /// Take the inter-process lock. Readers share it; writers hold it
    /// exclusively. Released when the returned guard drops.
    fn lock(&self, exclusive: bool) -> Result<FileLock> {
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;

        if exclusive {
            file.lock_exclusive().map_err(map_io)?;
        } else {
            file.lock_shared().map_err(map_io)?;
        }

        Ok(FileLock(file))
    }

    fn read_unlocked(&self) -> Result<Option<StoredCredentials>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io(e)),
        };

        let stored = serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            message: format!("{}: {}", self.path.display(), e),
        })?;

        Ok(Some(stored))
    }

    fn write_unlocked(&self, stored: &StoredCredentials) -> Result<()> {
        let json = serde_json::to_string_pretty(stored).map_err(|e| StorageError::Io {
            message: e.to_string(),
        })?;

        let temp = self.temp_path();
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&temp).map_err(map_io)?;
        file.write_all(json.as_bytes()).map_err(map_io)?;
        file.sync_all().map_err(map_io)?;

        // Restrictive permissions even if the temp file already existed.
        #[cfg(unix)]
        fs::set_permissions(&temp, fs::Permissions::from_mode(0o600)).map_err(map_io)?;

        fs::rename(&temp, &self.path).map_err(map_io)?;
        Ok(())
    }
}

struct FileLock(File);

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Result<Option<CredentialPair>> {
        Ok(self.load()?.map(StoredCredentials::into_pair))
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn set(&self, pair: &CredentialPair) -> Result<()> {
        let _lock = self.lock(true)?;
        self.write_unlocked(&StoredCredentials::from_pair(pair))?;
        debug!(refreshable = pair.refresh_token.is_some(), "Stored credentials");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        let _lock = self.lock(true)?;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cleared credentials");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("tether").join("credentials.json"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).get().unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.set(&CredentialPair::new("at-1", "rt-1")).unwrap();

        let pair = store.get().unwrap().unwrap();
        assert_eq!(pair.access_token.as_str(), "at-1");
        assert_eq!(pair.refresh_token.unwrap().as_str(), "rt-1");
    }

    #[test]
    fn access_only_pair_omits_refresh_token() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.set(&CredentialPair::access_only("at-1")).unwrap();

        let json = fs::read_to_string(store.path()).unwrap();
        assert!(!json.contains("refresh_token"));
        assert!(json.contains("updated_at"));
        assert!(store.get().unwrap().unwrap().refresh_token.is_none());
    }

    #[test]
    fn overwrite_replaces_pair() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.set(&CredentialPair::new("at-1", "rt-1")).unwrap();
        store.set(&CredentialPair::new("at-2", "rt-2")).unwrap();

        let pair = store.get().unwrap().unwrap();
        assert_eq!(pair.access_token.as_str(), "at-2");
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.set(&CredentialPair::new("at-1", "rt-1")).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.get().unwrap().is_none());

        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        let err = store.get().unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[test]
    fn clones_share_the_file() {
        let dir = TempDir::new().unwrap();
        let a = store(&dir);
        let b = a.clone();

        a.set(&CredentialPair::new("at-1", "rt-1")).unwrap();
        assert_eq!(b.get().unwrap().unwrap().access_token.as_str(), "at-1");
    }

    #[test]
    fn load_reports_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let before = Utc::now();

        store.set(&CredentialPair::new("at-1", "rt-1")).unwrap();

        let stored = store.load().unwrap().unwrap();
        assert!(stored.updated_at >= before);
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.set(&CredentialPair::new("at-1", "rt-1")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
