//! Store trait for persisted view state

use crate::core::error::StorageError;
use async_trait::async_trait;

/// String key/value persistence (local storage, files, ...)
///
/// Each key is a single mutable cell. There is no merge and no expiry:
/// `set` overwrites whatever was there.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if nothing is stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Forget `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
