use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Key holding the serialized favorite program names
pub const FAVORITES_KEY: &str = "resourceFavorites";

/// Key holding the number of chat messages used this session
pub const MESSAGE_COUNT_KEY: &str = "chatMessageCount";

/// Errors that can occur with client-side storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string key-value storage scoped to one client
///
/// Callers treat every error as "storage is unavailable" and fall back to
/// in-memory state.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store, for tests and sessions that need no durability
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, like a browser with storage disabled
    pub fn read_only() -> Self {
        Self {
            entries: Mutex::default(),
            read_only: true,
        }
    }

    /// Seed a value without going through `set`
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable("store is read-only".to_string()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys kept in one JSON object on disk
///
/// The file is rewritten on every `set`. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        // A corrupt file is replaced rather than blocking every write
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable store {}: {}", self.path.display(), e);
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let store = MemoryStore::read_only().with_entry("k", "v");
        assert!(matches!(store.set("k", "w"), Err(StorageError::Unavailable(_))));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get(FAVORITES_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        FileStore::new(&path).set(MESSAGE_COUNT_KEY, "3").unwrap();
        FileStore::new(&path).set(FAVORITES_KEY, "[]").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(MESSAGE_COUNT_KEY).unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_recovers_from_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get(FAVORITES_KEY).is_err());
        store.set(FAVORITES_KEY, "[\"A\"]").unwrap();
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[\"A\"]"));
    }
}
