//! In-memory implementation of KeyValueStore for testing and development

use crate::core::KeyValueStore;
use crate::core::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory key/value store
///
/// Useful for testing and ephemeral sessions. Clones share the same cells.
#[derive(Clone, Debug, Default)]
pub struct InMemoryKeyValueStore {
    cells: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.cells.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let cells = self
            .cells
            .read()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;

        Ok(cells.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut cells = self
            .cells
            .write()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;

        cells.insert(key.to_string(), value);

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut cells = self
            .cells
            .write()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;

        cells.remove(key);

        Ok(())
    }
}
