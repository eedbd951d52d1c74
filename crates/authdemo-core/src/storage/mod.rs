//! Persistent key-value storage backends.
//!
//! The session layer only needs synchronous get/set/remove on string keys,
//! so every backend implements the small `KeyValueStore` trait:
//!
//! - `MemoryStore`: in-process map, lost when the process exits
//! - `FileStore`: JSON document in the cache directory, survives restarts
//! - `KeyringStore`: one OS keychain entry per key

pub mod file;
pub mod keychain;
pub mod memory;

use thiserror::Error;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keychain(#[from] keyring::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous string key-value store.
///
/// Implementations use interior mutability so a store can be shared behind
/// an `Arc`. Concurrent writers race with last-write-wins semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never set or has been removed
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
