use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// In-memory key-value store. Sessions kept here do not survive a restart;
/// intended for tests and embedders that opt out of durable persistence.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in pairs {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic_operations() {
        let store = MemoryStore::new();
        assert!(store.get("token").unwrap().is_none());

        store
            .set_many(&[("token", "tok"), ("user", "{}")])
            .expect("Failed to write");
        assert_eq!(store.get("token").unwrap().as_deref(), Some("tok"));

        store.remove_many(&["token", "missing"]).expect("Failed to remove");
        assert!(store.get("token").unwrap().is_none());
        assert_eq!(store.get("user").unwrap().as_deref(), Some("{}"));
    }
}
