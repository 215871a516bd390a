use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Storage file name inside the store directory
const STORE_FILE: &str = "session.json";

/// File-backed key-value store.
///
/// All keys live in a single JSON object so that a multi-key write is one
/// file replacement: the document is written to a temporary file in the same
/// directory and renamed over the old one. A crash between writes therefore
/// never exposes a token without its matching expiry.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(STORE_FILE),
            lock: Mutex::new(()),
        })
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_map()?.remove(key))
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map()?;
        for (key, value) in pairs {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_map(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map()?;
        let mut changed = false;
        for key in keys {
            changed |= map.remove(*key).is_some();
        }
        if !changed {
            return Ok(());
        }
        if map.is_empty() && self.path.exists() {
            debug!(path = %self.path.display(), "Removing empty session store file");
            std::fs::remove_file(&self.path)?;
            return Ok(());
        }
        self.write_map(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_many_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileStore::new(dir.path().to_path_buf()).expect("Failed to create store");

        store
            .set_many(&[("token", "tok-1"), ("sessionExpiresAt", "1700000000000")])
            .expect("Failed to write pairs");

        assert_eq!(store.get("token").unwrap().as_deref(), Some("tok-1"));
        assert_eq!(
            store.get("sessionExpiresAt").unwrap().as_deref(),
            Some("1700000000000")
        );
        assert!(store.get("user").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        {
            let store = FileStore::new(dir.path().to_path_buf()).expect("Failed to create store");
            store.set("token", "tok-2").expect("Failed to write");
        }
        let reopened = FileStore::new(dir.path().to_path_buf()).expect("Failed to reopen store");
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_remove_many_tolerates_absent_keys() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileStore::new(dir.path().to_path_buf()).expect("Failed to create store");

        // Nothing written yet: removal must still succeed
        store
            .remove_many(&["token", "user", "sessionExpiresAt"])
            .expect("Removal of absent keys should succeed");

        store.set("token", "tok-3").expect("Failed to write");
        store
            .remove_many(&["token", "user"])
            .expect("Failed to remove");
        assert!(store.get("token").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileStore::new(dir.path().to_path_buf()).expect("Failed to create store");

        store.set("token", "old").expect("Failed to write");
        store.set("token", "new").expect("Failed to overwrite");
        assert_eq!(store.get("token").unwrap().as_deref(), Some("new"));
    }
}
