//! Durable key-value persistence for session state.
//!
//! The session store persists exactly three keys (`token`, `user`,
//! `sessionExpiresAt`); this module abstracts where they live:
//! - `FileStore`: a JSON document on disk, rewritten atomically
//! - `MemoryStore`: process-local map for tests and ephemeral sessions

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String key-value storage with multi-key writes.
///
/// `set_many` must apply all pairs or none; a crash mid-write must not leave
/// a partial set visible to a later reader.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove the given keys. Keys that are already absent are not an error.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;
}
