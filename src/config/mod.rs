//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::field::{FieldDef, ListSchema};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete configuration for one list screen
///
/// # Example
/// ```yaml
/// key_prefix: hms.wards
/// page_sizes: [10, 20, 50]
/// default_page_size: 20
/// fetch_timeout_ms: 15000
/// fields:
///   - { name: name, kind: text }
///   - { name: facility, kind: text }
///   - { name: active, kind: flag }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Namespace of every persisted key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Page sizes a user may pick
    #[serde(default = "default_page_sizes")]
    pub page_sizes: Vec<usize>,

    /// Page size used when none (or an unknown one) is persisted
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Maximum number of filter rows
    #[serde(default = "default_max_filters")]
    pub max_filters: usize,

    /// Timeout of one remote fetch; `null` waits forever
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: Option<u64>,

    /// Deletes in flight at once during a bulk delete (1 = strictly sequential)
    #[serde(default = "default_delete_concurrency")]
    pub delete_concurrency: usize,

    /// Fields of the managed records, in default column order
    pub fields: Vec<FieldDef>,
}

fn default_key_prefix() -> String {
    "hms.list".to_string()
}

fn default_page_sizes() -> Vec<usize> {
    vec![10, 20, 50]
}

fn default_page_size() -> usize {
    10
}

fn default_max_filters() -> usize {
    4
}

fn default_fetch_timeout_ms() -> Option<u64> {
    Some(30_000)
}

fn default_delete_concurrency() -> usize {
    1
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::wards()
    }
}

impl ListConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration of the ward list screen
    pub fn wards() -> Self {
        Self {
            key_prefix: "hms.wards".to_string(),
            page_sizes: default_page_sizes(),
            default_page_size: default_page_size(),
            max_filters: default_max_filters(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            delete_concurrency: default_delete_concurrency(),
            fields: ListSchema::wards().fields().to_vec(),
        }
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_sizes.is_empty() || self.page_sizes.contains(&0) {
            return Err(ConfigError::InvalidPageSizes(format!(
                "{:?}",
                self.page_sizes
            )));
        }
        if !self.page_sizes.contains(&self.default_page_size) {
            return Err(ConfigError::InvalidPageSizes(format!(
                "default {} not in {:?}",
                self.default_page_size, self.page_sizes
            )));
        }
        self.schema().map(|_| ())
    }

    pub fn schema(&self) -> Result<ListSchema, ConfigError> {
        ListSchema::new(self.fields.clone())
    }

    /// Fall back to the default page size when `size` is not offered
    pub fn sanitize_page_size(&self, size: usize) -> usize {
        if self.page_sizes.contains(&size) {
            size
        } else {
            self.default_page_size
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn max_filters(&self) -> usize {
        self.max_filters.max(1)
    }

    pub fn delete_concurrency(&self) -> usize {
        self.delete_concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldKind;

    #[test]
    fn test_default_config() {
        let config = ListConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.fields.len(), 5);
        assert_eq!(config.max_filters(), 4);
        assert_eq!(config.fetch_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_yaml_defaults_fill_in() {
        let config = ListConfig::from_yaml_str(
            r#"
fields:
  - { name: room_no, kind: text }
  - { name: occupied, kind: flag, searchable: false }
"#,
        )
        .unwrap();

        assert_eq!(config.key_prefix, "hms.list");
        assert_eq!(config.page_sizes, vec![10, 20, 50]);
        assert_eq!(config.delete_concurrency(), 1);
        let schema = config.schema().unwrap();
        assert_eq!(schema.kind_of("occupied"), Some(FieldKind::Flag));
        assert!(!schema.is_searchable("occupied"));
    }

    #[test]
    fn test_yaml_null_timeout_disables() {
        let config = ListConfig::from_yaml_str(
            "fetch_timeout_ms: null\nfields:\n  - { name: name, kind: text }\n",
        )
        .unwrap();
        assert_eq!(config.fetch_timeout(), None);
    }

    #[test]
    fn test_invalid_page_sizes_rejected() {
        let err = ListConfig::from_yaml_str(
            "page_sizes: [10, 20]\ndefault_page_size: 50\nfields:\n  - { name: name, kind: text }\n",
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let err = ListConfig::from_yaml_str("fields: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptySchema));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = ListConfig::wards();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = ListConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_sanitize_page_size() {
        let config = ListConfig::wards();
        assert_eq!(config.sanitize_page_size(20), 20);
        assert_eq!(config.sanitize_page_size(7), 10);
    }
}
