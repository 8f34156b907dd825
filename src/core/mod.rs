//! Core module containing the list engine's types and traits

pub mod columns;
pub mod error;
pub mod field;
pub mod filter;
pub mod preferences;
pub mod query;
pub mod record;
pub mod scope;
pub mod service;
pub mod sort;
pub mod store;

pub use columns::{ColumnConfig, ColumnMove};
pub use error::{ConfigError, ListError, RemoteError, StorageError};
pub use field::{FieldDef, FieldKind, FieldValue, ListSchema};
pub use filter::{FilterCriterion, FilterLogic, FilterOperator, FilterSet, SearchScope};
pub use preferences::{Density, Preferences};
pub use query::{Page, PaginationMeta, QueryParams};
pub use record::{FieldResolver, Record, RecordFieldResolver};
pub use scope::{AccessScope, ManagementScope, StorageKey};
pub use service::{FetchResult, RecordRemover, RecordSource};
pub use sort::{SortDirection, SortSpec};
pub use store::KeyValueStore;
