//! List controller: selection, owned state and the async orchestrator

pub mod list;
pub mod selection;
pub mod state;

pub use list::{BulkDeleteReport, ListController, ListControllerBuilder, RefreshOutcome, RefreshTask};
pub use selection::Selection;
pub use state::{ListState, ListView, Notice};
