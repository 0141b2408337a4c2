//! Durable client-side storage boundary.
//!
//! Tokens and the session snapshot are plain string entries, the same way a
//! browser keeps them in local storage. [`AuthState`](crate::AuthState) is the
//! only writer of these keys.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use thiserror::Error;

/// Access token entry.
pub const ACCESS_TOKEN_KEY: &str = "auth_token";
/// Refresh token entry.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Serialized session snapshot used for rehydration.
pub const SESSION_STORE_KEY: &str = "auth-storage";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode storage entries: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value string storage injected into the authorization state.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Nothing survives the process; used by tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// JSON-file storage that survives restarts.
///
/// The whole map is rewritten on every change through a sibling temp file and
/// a rename, so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A corrupt file is discarded and storage starts empty; the session is
    /// then treated as missing at startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = ?path, error = %err, "discarding corrupt storage file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Storage file under the OS app data directory.
    pub fn default_location() -> anyhow::Result<PathBuf> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

        let mut dir = base;
        dir.push("easyway-admin");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create storage directory at {:?}", dir))?;

        dir.push("storage.json");
        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let raw = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("easyway-storage-{}", uuid::Uuid::now_v7()))
            .join("storage.json")
    }

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        storage.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_survives_reopen() {
        let path = temp_path();
        {
            let storage = FileStorage::open(&path).unwrap();
            storage.set(ACCESS_TOKEN_KEY, "abc").unwrap();
            storage.set(REFRESH_TOKEN_KEY, "def").unwrap();
            storage.remove(REFRESH_TOKEN_KEY).unwrap();
        }

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
