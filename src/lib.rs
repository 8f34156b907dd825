//! # HMS List View
//!
//! Client-side list management for hospital administration screens: search,
//! multi-criterion filtering, natural sorting, pagination, persisted view
//! preferences, an offline snapshot cache and tenant-scoped bulk deletion.
//!
//! ## Features
//!
//! - **Schema-Driven**: Fields, kinds and sortability come from a [`ListSchema`](core::ListSchema)
//! - **Filter Engine**: Up to four criteria combined with AND/OR, tri-state flag matching
//! - **Natural Sort**: `Ward 2` before `Ward 10`, stable for equal keys
//! - **Persisted Preferences**: Columns, sort, filters and density per user and scope
//! - **Offline Fallback**: Last known-good snapshot served while the network is down
//! - **Scoped Bulk Delete**: Only records inside the acting tenant are touched
//! - **Configuration-Based**: Page sizes, limits and fields via YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use listview::prelude::*;
//!
//! let mut wards = ListController::builder(api.clone(), api)
//!     .with_config(ListConfig::from_yaml_file("config/wards.yaml")?)
//!     .with_storage(JsonFileStore::new("/var/lib/hms/views"))
//!     .with_scope(AccessScope::own_tenant(user.id, user.tenant_id))
//!     .build()?;
//!
//! wards.mount().await;
//! wards.search("icu").await;
//! wards.sort("name").await;
//!
//! let view = wards.view();
//! println!("{} of {} wards", view.filtered_count, view.total_count);
//! ```

pub mod config;
pub mod controller;
pub mod core;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        AccessScope, ColumnMove, Density, FetchResult, FieldDef, FieldKind, FieldResolver,
        FieldValue, FilterCriterion, FilterLogic, FilterOperator, ListSchema, ManagementScope,
        PaginationMeta, Preferences, QueryParams, Record, RecordFieldResolver, SearchScope,
        SortDirection, SortSpec,
    };

    // === Errors ===
    pub use crate::core::{ConfigError, ListError, RemoteError, StorageError};

    // === Service Traits ===
    pub use crate::core::{KeyValueStore, RecordRemover, RecordSource};

    // === Controller ===
    pub use crate::controller::{BulkDeleteReport, ListController, ListView, Notice};

    // === Storage ===
    pub use crate::storage::{CacheStore, InMemoryKeyValueStore, JsonFileStore, PreferenceStore};

    // === Config ===
    pub use crate::config::ListConfig;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
