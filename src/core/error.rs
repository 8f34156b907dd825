//! Typed error handling for list controllers
//!
//! Only remote fetch failures ever reach the rendering layer. Everything
//! else is recovered inside the controller:
//!
//! - [`RemoteError`]: an opaque code reported by the remote listing call,
//!   passed through unchanged so the display layer can translate it
//! - [`StorageError`]: a persistence backend failed; loads degrade to
//!   "nothing stored" and saves are logged and skipped
//! - [`ConfigError`]: an invalid schema or configuration document
//!
//! # Example
//!
//! ```rust,ignore
//! controller.refresh().await;
//! if let Some(err) = controller.view().error {
//!     // "NETWORK_UNAVAILABLE", "FETCH_TIMEOUT", ...
//!     show_banner(err.error_code());
//! }
//! ```

use thiserror::Error;

/// Error surfaced to the rendering layer as the list's error state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// The remote listing call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The remote listing call did not answer within the configured timeout
    #[error("fetch timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

impl ListError {
    /// Code handed to the display layer for translation
    pub fn error_code(&self) -> &str {
        match self {
            ListError::Remote(e) => e.error_code(),
            ListError::Timeout { .. } => "FETCH_TIMEOUT",
        }
    }
}

// =============================================================================
// Remote Errors
// =============================================================================

/// Failure reported by a [`RecordSource`](crate::core::service::RecordSource)
///
/// The code is opaque to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote error {code}")]
pub struct RemoteError {
    pub code: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn error_code(&self) -> &str {
        &self.code
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by key/value persistence backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded for storage
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend lock was poisoned by a panicking writer
    #[error("storage lock poisoned: {0}")]
    Poisoned(String),
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Io { .. } => "STORAGE_IO_ERROR",
            StorageError::Encode { .. } => "STORAGE_ENCODE_ERROR",
            StorageError::Poisoned(_) => "STORAGE_POISONED",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors in list schema or configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Schema declares no fields
    #[error("list schema must declare at least one field")]
    EmptySchema,

    /// Two fields share a name
    #[error("duplicate field '{0}' in list schema")]
    DuplicateField(String),

    /// No field is sortable, so there is nothing to fall back to
    #[error("list schema must declare at least one sortable field")]
    NoSortableField,

    /// Page size set is empty or contains zero
    #[error("invalid page sizes: {0}")]
    InvalidPageSizes(String),

    /// Document could not be read
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// Document could not be parsed
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::EmptySchema
            | ConfigError::DuplicateField(_)
            | ConfigError::NoSortableField => "SCHEMA_ERROR",
            ConfigError::InvalidPageSizes(_) => "CONFIG_ERROR",
            ConfigError::Read(_) | ConfigError::Parse(_) => "CONFIG_LOAD_ERROR",
        }
    }
}
