//! Cache fallback store: last known-good snapshot per subject and scope

use crate::core::KeyValueStore;
use crate::core::error::StorageError;
use crate::core::scope::{ManagementScope, StorageKey};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Holds exactly one snapshot per key, overwritten on every refresh
///
/// No TTL and no eviction.
pub struct CacheStore<R> {
    backend: Arc<dyn KeyValueStore>,
    keys: StorageKey,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for CacheStore<R> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            keys: self.keys.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> CacheStore<R>
where
    R: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn KeyValueStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            keys: StorageKey::new(key_prefix),
            _record: PhantomData,
        }
    }

    pub fn key(&self, subject_id: &str, scope: ManagementScope) -> String {
        self.keys.cache(subject_id, scope)
    }

    /// Read the snapshot; anything unreadable is skipped record by record
    pub async fn load(&self, subject_id: &str, scope: ManagementScope) -> Vec<R> {
        let key = self.key(subject_id, scope);
        let raw = match self.backend.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read cached snapshot");
                return Vec::new();
            }
        };

        let Ok(Value::Array(rows)) = serde_json::from_str::<Value>(&raw) else {
            tracing::warn!(key = %key, "Discarding unreadable cached snapshot");
            return Vec::new();
        };

        let total = rows.len();
        let records: Vec<R> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();
        if records.len() != total {
            tracing::warn!(
                key = %key,
                skipped = total - records.len(),
                "Skipped malformed cached records"
            );
        }
        tracing::debug!(key = %key, count = records.len(), "Loaded cached snapshot");
        records
    }

    /// Overwrite the snapshot
    pub async fn save(
        &self,
        subject_id: &str,
        scope: ManagementScope,
        records: &[R],
    ) -> Result<(), StorageError> {
        let key = self.key(subject_id, scope);
        let encoded = serde_json::to_string(records).map_err(|source| StorageError::Encode {
            key: key.clone(),
            source,
        })?;
        self.backend.set(&key, encoded).await?;
        tracing::debug!(key = %key, count = records.len(), "Cached snapshot");
        Ok(())
    }
}
