//! JSON-file backed key-value store.
//!
//! The whole store is a single document in the cache directory. It is read
//! once when opened and rewritten after every change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{KeyValueStore, StorageResult};

/// Store file name in cache directory
const STORE_FILE: &str = "storage.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

pub struct FileStore {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl FileStore {
    /// Open the store in `dir`, loading any existing document
    pub fn open(dir: &Path) -> StorageResult<Self> {
        Self::open_file(dir.join(STORE_FILE))
    }

    /// Open the store at an explicit file path
    pub fn open_file(path: PathBuf) -> StorageResult<Self> {
        let document = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            StoreDocument::default()
        };
        debug!(path = %path.display(), keys = document.entries.len(), "File store opened");

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Open the store, starting empty if the existing file cannot be read.
    /// The unreadable file is replaced on the next write.
    pub fn open_or_empty(dir: &Path) -> Self {
        let path = dir.join(STORE_FILE);
        match Self::open_file(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable storage file, starting empty");
                Self {
                    path,
                    document: Mutex::new(StoreDocument::default()),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the document was last written, if ever
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.lock().updated_at
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreDocument> {
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write `document` to disk. Only a document that reached disk replaces
    /// the in-memory copy, so a failed write leaves both unchanged.
    fn commit(&self, current: &mut StoreDocument, mut document: StoreDocument) -> StorageResult<()> {
        document.updated_at = Some(Utc::now());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, contents)?;
        *current = document;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut current = self.lock();
        let mut next = current.clone();
        next.entries.insert(key.to_string(), value.to_string());
        self.commit(&mut current, next)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut current = self.lock();
        if !current.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = current.clone();
        next.entries.remove(key);
        self.commit(&mut current, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
        assert!(store.updated_at().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("token", "t-123").unwrap();
            store.set("user", "alice").unwrap();
            assert!(store.updated_at().is_some());
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("t-123"));
        assert_eq!(reopened.get("user").unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("token", "t").unwrap();
        store.remove("token").unwrap();
        store.remove("token").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("token").unwrap(), None);
    }

    #[test]
    fn test_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::open(&nested).unwrap();
        store.set("roles", "user").unwrap();
        assert!(nested.join(STORE_FILE).exists());
    }

    #[test]
    fn test_failed_set_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("user", "alice").unwrap();

        // A directory where the file should be makes every write fail
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        assert!(store.set("token", "t").is_err());
        assert_eq!(store.get("token").unwrap(), None);
        assert_eq!(store.get("user").unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("token", "t").unwrap();

        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        assert!(store.remove("token").is_err());
        assert_eq!(store.get("token").unwrap().as_deref(), Some("t"));
    }

    #[test]
    fn test_open_or_empty_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "not json").unwrap();

        let store = FileStore::open_or_empty(dir.path());
        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "fresh").unwrap();
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "not json").unwrap();
        assert!(FileStore::open(dir.path()).is_err());
    }
}
