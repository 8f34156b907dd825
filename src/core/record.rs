//! Record traits defining what the controller needs from a domain entity

use crate::core::field::FieldValue;
use std::collections::HashSet;

/// A domain entity managed by a list (ward, room, tenant, ...).
///
/// The controller only needs a stable identifier, the owning tenant for
/// access checks, and dynamic access to named fields.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable identifier, unique within a snapshot
    fn id(&self) -> &str;

    /// Owning tenant, used to decide whether the acting scope may mutate it.
    ///
    /// Returns None for system-wide records.
    fn tenant_id(&self) -> Option<&str> {
        None
    }

    /// Get the value of a specific field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

/// Maps `(record, field)` to the display value used for search, filtering and sorting
pub trait FieldResolver<R>: Send + Sync {
    fn resolve(&self, record: &R, field: &str) -> String;
}

impl<R, F> FieldResolver<R> for F
where
    F: Fn(&R, &str) -> String + Send + Sync,
{
    fn resolve(&self, record: &R, field: &str) -> String {
        self(record, field)
    }
}

/// Resolver reading straight from [`Record::field_value`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFieldResolver;

impl<R: Record> FieldResolver<R> for RecordFieldResolver {
    fn resolve(&self, record: &R, field: &str) -> String {
        record
            .field_value(field)
            .map(|v| v.display())
            .unwrap_or_default()
    }
}

/// Enforce the snapshot id invariant: no empty ids, no duplicates.
///
/// The first occurrence of an id wins.
pub fn normalize_snapshot<R: Record>(records: Vec<R>) -> Vec<R> {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<R> = records
        .into_iter()
        .filter(|r| !r.id().is_empty() && seen.insert(r.id().to_string()))
        .collect();

    if kept.len() != total {
        tracing::warn!(
            dropped = total - kept.len(),
            "Dropped records with empty or duplicate ids from snapshot"
        );
    }
    kept
}
