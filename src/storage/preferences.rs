//! Preference store: the view configuration bundle per subject and scope

use crate::config::ListConfig;
use crate::core::error::StorageError;
use crate::core::field::ListSchema;
use crate::core::preferences::Preferences;
use crate::core::scope::{ManagementScope, StorageKey};
use crate::core::KeyValueStore;
use serde_json::Value;
use std::sync::Arc;

/// Loads and saves [`Preferences`] under `prefix.prefs.subject.scope`
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore>,
    keys: StorageKey,
    schema: Arc<ListSchema>,
    config: Arc<ListConfig>,
}

impl PreferenceStore {
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        schema: Arc<ListSchema>,
        config: Arc<ListConfig>,
    ) -> Self {
        Self {
            backend,
            keys: StorageKey::new(config.key_prefix.clone()),
            schema,
            config,
        }
    }

    pub fn key(&self, subject_id: &str, scope: ManagementScope) -> String {
        self.keys.preferences(subject_id, scope)
    }

    /// Restore the stored bundle, re-sanitized field by field
    ///
    /// Returns None when nothing usable is stored. Backend failures and
    /// unreadable documents are logged and treated the same way.
    pub async fn load(&self, subject_id: &str, scope: ManagementScope) -> Option<Preferences> {
        let key = self.key(subject_id, scope);
        let raw = match self.backend.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read preferences");
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(doc) if doc.is_object() => {
                tracing::debug!(key = %key, "Loaded preferences");
                Some(Preferences::from_value(&doc, &self.schema, &self.config))
            }
            Ok(_) | Err(_) => {
                tracing::warn!(key = %key, "Discarding unreadable preferences document");
                None
            }
        }
    }

    /// Overwrite the stored bundle with `prefs`
    pub async fn save(
        &self,
        subject_id: &str,
        scope: ManagementScope,
        prefs: &Preferences,
    ) -> Result<(), StorageError> {
        let key = self.key(subject_id, scope);
        let encoded = serde_json::to_string(&prefs.to_value()).map_err(|source| {
            StorageError::Encode {
                key: key.clone(),
                source,
            }
        })?;
        self.backend.set(&key, encoded).await?;
        tracing::debug!(key = %key, "Saved preferences");
        Ok(())
    }
}
