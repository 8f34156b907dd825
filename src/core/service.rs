//! Service traits for the remote data-access collaborators

use crate::core::error::RemoteError;
use crate::core::query::QueryParams;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Payload of a listing call
///
/// Backends answer either with an envelope or with a bare array; both
/// shapes deserialize into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchResult<R> {
    Envelope { items: Vec<R> },
    Items(Vec<R>),
}

impl<R> FetchResult<R> {
    pub fn into_items(self) -> Vec<R> {
        match self {
            FetchResult::Envelope { items } | FetchResult::Items(items) => items,
        }
    }
}

impl<R> From<Vec<R>> for FetchResult<R> {
    fn from(items: Vec<R>) -> Self {
        FetchResult::Items(items)
    }
}

/// Remote listing of records
///
/// Implementations talk to the backend; the controller only consumes the
/// resulting snapshot.
#[async_trait]
pub trait RecordSource<R>: Send + Sync {
    /// Fetch the full collection visible under `params`
    async fn fetch_page(&self, params: &QueryParams) -> Result<FetchResult<R>, RemoteError>;
}

/// Remote deletion of a single record
#[async_trait]
pub trait RecordRemover: Send + Sync {
    /// Delete one record by id
    ///
    /// `Ok(false)` and `Err(_)` both mean the record was not removed. The
    /// controller treats either as a per-item failure, never as fatal.
    async fn delete_one(&self, id: &str) -> Result<bool>;
}
