//! Shared test harness for list controller testing
//!
//! Provides `TestWard` implementing `Record`, and `MockBackend`, a scripted
//! in-process backend implementing both `RecordSource` and `RecordRemover`
//! that records every call made against it.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod harness;
//! use harness::*;
//! ```

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use listview::config::ListConfig;
use listview::controller::ListController;
use listview::core::{
    AccessScope, FetchResult, FieldValue, QueryParams, Record, RecordRemover, RecordSource,
    RemoteError,
};
use listview::storage::InMemoryKeyValueStore;

// ---------------------------------------------------------------------------
// TestWard
// ---------------------------------------------------------------------------

/// A ward row as the backend returns it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestWard {
    pub id: String,
    pub name: String,
    pub tenant: Option<String>,
    pub facility: String,
    #[serde(rename = "type")]
    pub ward_type: String,
    pub active: Option<bool>,
}

impl Record for TestWard {
    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::from(self.name.as_str())),
            "tenant" => self.tenant.as_deref().map(FieldValue::from),
            "facility" => Some(FieldValue::from(self.facility.as_str())),
            "type" => Some(FieldValue::from(self.ward_type.as_str())),
            "active" => self.active.map(FieldValue::Boolean),
            _ => None,
        }
    }
}

/// Ward `id` in tenant `t1`, active when `id` is even
pub fn ward(id: usize) -> TestWard {
    ward_in(id, "t1")
}

pub fn ward_in(id: usize, tenant: &str) -> TestWard {
    TestWard {
        id: id.to_string(),
        name: format!("Ward {id}"),
        tenant: Some(tenant.to_string()),
        facility: "North Campus".to_string(),
        ward_type: if id % 3 == 0 { "ICU" } else { "General" }.to_string(),
        active: Some(id % 2 == 0),
    }
}

pub fn wards(n: usize) -> Vec<TestWard> {
    (1..=n).map(ward).collect()
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct BackendState {
    rows: Vec<TestWard>,
    scripted: VecDeque<Result<Vec<TestWard>, RemoteError>>,
    fetch_delay: Option<Duration>,
    fetches: Vec<QueryParams>,
    deletes: Vec<String>,
    rejected: HashSet<String>,
    failing: HashSet<String>,
}

/// Scripted backend shared between the source and remover roles
///
/// Fetches answer with the next scripted response if any, otherwise with
/// the current rows (restricted to the requested tenant). Successful deletes
/// remove the row so the follow-up refetch reflects them.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    pub fn with_rows(rows: Vec<TestWard>) -> Self {
        let backend = Self::default();
        backend.set_rows(rows);
        backend
    }

    pub fn set_rows(&self, rows: Vec<TestWard>) {
        self.state.lock().unwrap().rows = rows;
    }

    /// Queue a one-shot response for the next fetch
    pub fn script(&self, response: Result<Vec<TestWard>, RemoteError>) {
        self.state.lock().unwrap().scripted.push_back(response);
    }

    pub fn delay_fetches(&self, delay: Duration) {
        self.state.lock().unwrap().fetch_delay = Some(delay);
    }

    /// `delete_one(id)` answers `Ok(false)`
    pub fn reject_delete(&self, id: &str) {
        self.state.lock().unwrap().rejected.insert(id.to_string());
    }

    /// `delete_one(id)` answers `Err(_)`
    pub fn fail_delete(&self, id: &str) {
        self.state.lock().unwrap().failing.insert(id.to_string());
    }

    pub fn fetches(&self) -> Vec<QueryParams> {
        self.state.lock().unwrap().fetches.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.state.lock().unwrap().deletes.clone()
    }
}

#[async_trait]
impl RecordSource<TestWard> for MockBackend {
    async fn fetch_page(
        &self,
        params: &QueryParams,
    ) -> std::result::Result<FetchResult<TestWard>, RemoteError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.fetches.push(params.clone());
            state.fetch_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(response) = state.scripted.pop_front() {
            return response.map(FetchResult::from);
        }
        let rows = state
            .rows
            .iter()
            .filter(|w| match &params.tenant_id {
                Some(tenant) => w.tenant.as_deref() == Some(tenant.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(FetchResult::Envelope { items: rows })
    }
}

#[async_trait]
impl RecordRemover for MockBackend {
    async fn delete_one(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.deletes.push(id.to_string());
        if state.failing.contains(id) {
            return Err(anyhow!("connection reset while deleting {id}"));
        }
        if state.rejected.contains(id) {
            return Ok(false);
        }
        state.rows.retain(|w| w.id != id);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Install a subscriber honouring `RUST_LOG`; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Controller over `backend` persisting into `storage`, not yet mounted
pub fn controller(
    backend: &MockBackend,
    storage: &InMemoryKeyValueStore,
    config: ListConfig,
    scope: AccessScope,
) -> ListController<TestWard> {
    ListController::builder(backend.clone(), backend.clone())
        .with_config(config)
        .with_storage(storage.clone())
        .with_scope(scope)
        .build()
        .expect("valid ward config")
}

/// Mounted controller acting for admin `u1` over every tenant
pub async fn mounted_admin(
    backend: &MockBackend,
    storage: &InMemoryKeyValueStore,
) -> ListController<TestWard> {
    init_tracing();
    let mut c = controller(
        backend,
        storage,
        ListConfig::wards(),
        AccessScope::all_tenants("u1"),
    );
    c.mount().await;
    c
}
