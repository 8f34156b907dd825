//! Async list controller wiring state, stores and remote collaborators together

use crate::config::ListConfig;
use crate::controller::state::{ListState, ListView, Notice};
use crate::core::columns::ColumnMove;
use crate::core::error::{ConfigError, ListError};
use crate::core::field::ListSchema;
use crate::core::filter::{FilterLogic, SearchScope};
use crate::core::preferences::Density;
use crate::core::query::QueryParams;
use crate::core::record::{FieldResolver, Record, RecordFieldResolver};
use crate::core::scope::AccessScope;
use crate::core::service::{FetchResult, RecordRemover, RecordSource};
use crate::core::sort::SortSpec;
use crate::core::KeyValueStore;
use crate::storage::{CacheStore, InMemoryKeyValueStore, PreferenceStore};
use futures::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of [`ListController::bulk_delete`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    /// Ids selected when the batch started
    pub requested: usize,
    /// Deletes confirmed by the remote side
    pub removed: usize,
    /// Deletes attempted but not confirmed
    pub failed: usize,
    /// Ids outside the acting scope (or no longer present), never attempted
    pub skipped: usize,
}

/// A fetch detached from the controller
///
/// Obtained from [`ListController::begin_refresh`]. Running it does not
/// borrow the controller; hand the outcome back to
/// [`ListController::complete_refresh`], which drops it if a newer fetch
/// was started or the controller has since changed scope or been unmounted.
pub struct RefreshTask<R> {
    source: Arc<dyn RecordSource<R>>,
    params: QueryParams,
    timeout: Option<Duration>,
    generation: u64,
}

/// Result of a [`RefreshTask`], tagged with the generation it was started in
pub struct RefreshOutcome<R> {
    generation: u64,
    result: Result<Vec<R>, ListError>,
}

impl<R> RefreshOutcome<R> {
    pub fn result(&self) -> &Result<Vec<R>, ListError> {
        &self.result
    }
}

impl<R: Record> RefreshTask<R> {
    pub async fn run(self) -> RefreshOutcome<R> {
        let fetch = self.source.fetch_page(&self.params);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch).await {
                Ok(fetched) => fetched.map_err(ListError::from),
                Err(_) => Err(ListError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => fetch.await.map_err(ListError::from),
        };

        RefreshOutcome {
            generation: self.generation,
            result: result.map(FetchResult::into_items),
        }
    }
}

/// Client-side list management for one entity screen
///
/// Owns the [`ListState`] and drives persistence and remote calls around it.
/// Preference-affecting actions re-save the full bundle once the initial
/// load has completed; nothing is written before that.
pub struct ListController<R> {
    state: ListState<R>,
    scope: AccessScope,
    config: Arc<ListConfig>,
    source: Arc<dyn RecordSource<R>>,
    remover: Arc<dyn RecordRemover>,
    preferences: PreferenceStore,
    cache: CacheStore<R>,
    prefs_loaded: bool,
    generation: u64,
}

impl<R> ListController<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    pub fn builder(
        source: impl RecordSource<R> + 'static,
        remover: impl RecordRemover + 'static,
    ) -> ListControllerBuilder<R> {
        ListControllerBuilder::new(source, remover)
    }

    // === Accessors ===

    pub fn view(&self) -> ListView<R> {
        self.state.view()
    }

    pub fn state(&self) -> &ListState<R> {
        &self.state
    }

    pub fn scope(&self) -> &AccessScope {
        &self.scope
    }

    pub fn preferences_loaded(&self) -> bool {
        self.prefs_loaded
    }

    // === Lifecycle ===

    /// Restore preferences and the cached snapshot, then fetch
    ///
    /// Does nothing until the scope is resolved.
    pub async fn mount(&mut self) {
        if !self.scope.resolved {
            tracing::debug!("Scope unresolved, deferring mount");
            return;
        }

        let subject = self.scope.subject_id.clone();
        let management = self.scope.management();
        let (prefs, cached) = futures::join!(
            self.preferences.load(&subject, management),
            self.cache.load(&subject, management),
        );

        match prefs {
            Some(prefs) => self.state.apply_preferences(prefs),
            None => self.state.reset_preferences(),
        }
        self.state.receive_cache(cached);
        self.prefs_loaded = true;
        tracing::debug!(subject = %subject, scope = management.as_str(), "Mounted list");

        self.refresh().await;
    }

    /// Drop in-flight work and stop persisting
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.prefs_loaded = false;
        self.state.set_loading(false);
    }

    /// Switch to another subject or management scope and remount
    pub async fn set_scope(&mut self, scope: AccessScope) {
        self.unmount();
        self.scope = scope;
        self.state.reset_data();
        self.mount().await;
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.state.set_offline(offline);
    }

    // === Remote data ===

    /// Start a fetch; None while the scope is unresolved
    ///
    /// Supersedes every fetch started before it: only the latest one commits.
    pub fn begin_refresh(&mut self) -> Option<RefreshTask<R>> {
        if !self.scope.resolved {
            return None;
        }
        self.generation += 1;
        self.state.set_loading(true);
        Some(RefreshTask {
            source: self.source.clone(),
            params: self.scope.query_params(),
            timeout: self.config.fetch_timeout(),
            generation: self.generation,
        })
    }

    /// Commit a finished fetch
    ///
    /// Returns false when the outcome belongs to a superseded generation and
    /// was dropped.
    pub async fn complete_refresh(&mut self, outcome: RefreshOutcome<R>) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.generation,
                "Dropping result of superseded fetch"
            );
            return false;
        }

        self.state.set_loading(false);
        match outcome.result {
            Ok(records) => {
                self.state.receive_live(records);
                if let Some(live) = self.state.live_items() {
                    let management = self.scope.management();
                    if let Err(e) = self
                        .cache
                        .save(&self.scope.subject_id, management, live)
                        .await
                    {
                        tracing::warn!(error = %e, "Failed to cache snapshot");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(code = e.error_code(), "Fetch failed");
                self.state.set_error(e);
            }
        }
        true
    }

    pub async fn refresh(&mut self) {
        if let Some(task) = self.begin_refresh() {
            let outcome = task.run().await;
            self.complete_refresh(outcome).await;
        }
    }

    /// Clear the error state and fetch again
    pub async fn retry(&mut self) {
        self.state.clear_error();
        self.refresh().await;
    }

    // === Persistence ===

    async fn persist(&mut self) {
        if !self.prefs_loaded {
            return;
        }
        let management = self.scope.management();
        if let Err(e) = self
            .preferences
            .save(&self.scope.subject_id, management, self.state.preferences())
            .await
        {
            tracing::warn!(error = %e, code = e.error_code(), "Failed to save preferences");
        }
    }

    // === Actions ===

    /// Search text lives for the session only and is never saved
    pub async fn search(&mut self, query: &str) {
        self.state.set_search(query);
    }

    pub async fn set_search_scope(&mut self, scope: SearchScope) {
        self.state.set_search_scope(scope);
        self.persist().await;
    }

    pub async fn set_filter_field(&mut self, id: &str, field: &str) {
        self.state.set_filter_field(id, field);
        self.persist().await;
    }

    pub async fn set_filter_operator(&mut self, id: &str, operator: &str) {
        self.state.set_filter_operator(id, operator);
        self.persist().await;
    }

    pub async fn set_filter_value(&mut self, id: &str, value: &str) {
        self.state.set_filter_value(id, value);
        self.persist().await;
    }

    pub async fn set_filter_logic(&mut self, logic: FilterLogic) {
        self.state.set_filter_logic(logic);
        self.persist().await;
    }

    pub async fn add_filter(&mut self) -> Option<String> {
        let id = self.state.add_filter()?;
        self.persist().await;
        Some(id)
    }

    pub async fn remove_filter(&mut self, id: &str) {
        self.state.remove_filter(id);
        self.persist().await;
    }

    pub async fn sort(&mut self, field: &str) {
        self.state.sort(field);
        self.persist().await;
    }

    pub async fn set_sort(&mut self, spec: SortSpec) {
        self.state.set_sort(spec);
        self.persist().await;
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.set_page(page);
    }

    pub async fn set_page_size(&mut self, size: usize) {
        self.state.set_page_size(size);
        self.persist().await;
    }

    pub async fn toggle_column(&mut self, field: &str) {
        if self.state.toggle_column(field) {
            self.persist().await;
        }
    }

    pub async fn move_column(&mut self, field: &str, direction: ColumnMove) {
        if self.state.move_column(field, direction) {
            self.persist().await;
        }
    }

    pub async fn set_density(&mut self, density: Density) {
        self.state.set_density(density);
        self.persist().await;
    }

    pub fn toggle_selection(&mut self, id: &str) {
        self.state.toggle_selection(id);
    }

    pub fn toggle_current_page(&mut self, checked: bool) {
        self.state.toggle_current_page(checked);
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    pub fn dismiss_notice(&mut self) {
        self.state.dismiss_notice();
    }

    // === Bulk mutation ===

    /// Delete every selected record the acting scope may touch
    ///
    /// Individual failures never stop the batch. With the default
    /// concurrency of 1 deletes run strictly one after another in selection
    /// order. The list is refetched afterwards instead of splicing locally.
    pub async fn bulk_delete(&mut self) -> BulkDeleteReport {
        let selected: Vec<String> = self.state.selection().ids().map(str::to_string).collect();
        let mut report = BulkDeleteReport {
            requested: selected.len(),
            ..Default::default()
        };
        if selected.is_empty() {
            return report;
        }

        let mut permitted = Vec::with_capacity(selected.len());
        for id in selected {
            match self.state.find(&id) {
                Some(record) if self.scope.permits(record) => permitted.push(id),
                _ => {
                    tracing::debug!(id = %id, "Skipping record outside acting scope");
                    report.skipped += 1;
                }
            }
        }

        let remover = self.remover.clone();
        let outcomes: Vec<(String, bool)> = futures::stream::iter(permitted)
            .map(|id| {
                let remover = remover.clone();
                async move {
                    let removed = match remover.delete_one(&id).await {
                        Ok(removed) => removed,
                        Err(e) => {
                            tracing::warn!(id = %id, error = %e, "Delete failed");
                            false
                        }
                    };
                    (id, removed)
                }
            })
            .buffered(self.config.delete_concurrency())
            .collect()
            .await;

        for (id, removed) in outcomes {
            if removed {
                report.removed += 1;
                self.state.deselect(&id);
            } else {
                report.failed += 1;
            }
        }

        tracing::info!(
            requested = report.requested,
            removed = report.removed,
            failed = report.failed,
            skipped = report.skipped,
            "Bulk delete finished"
        );
        self.state.set_notice(Notice::BulkDeleted {
            removed: report.removed,
            requested: report.requested,
        });

        self.refresh().await;
        report
    }
}

/// Builder for [`ListController`]
///
/// # Example
///
/// ```ignore
/// let mut controller = ListController::builder(ward_api.clone(), ward_api)
///     .with_config(ListConfig::wards())
///     .with_storage(JsonFileStore::new(data_dir))
///     .with_scope(AccessScope::own_tenant(user_id, tenant_id))
///     .build()?;
/// controller.mount().await;
/// ```
pub struct ListControllerBuilder<R> {
    source: Arc<dyn RecordSource<R>>,
    remover: Arc<dyn RecordRemover>,
    config: ListConfig,
    resolver: Option<Arc<dyn FieldResolver<R>>>,
    storage: Option<Arc<dyn KeyValueStore>>,
    scope: AccessScope,
}

impl<R> ListControllerBuilder<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    pub fn new(source: impl RecordSource<R> + 'static, remover: impl RecordRemover + 'static) -> Self {
        Self {
            source: Arc::new(source),
            remover: Arc::new(remover),
            config: ListConfig::default(),
            resolver: None,
            storage: None,
            scope: AccessScope::unresolved(),
        }
    }

    pub fn with_config(mut self, config: ListConfig) -> Self {
        self.config = config;
        self
    }

    /// Override how field display values are derived (defaults to [`RecordFieldResolver`])
    pub fn with_resolver(mut self, resolver: impl FieldResolver<R> + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Persistence backend for preferences and the cache (defaults to in-memory)
    pub fn with_storage(mut self, storage: impl KeyValueStore + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    pub fn with_scope(mut self, scope: AccessScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn build(self) -> Result<ListController<R>, ConfigError> {
        self.config.validate()?;
        let schema: Arc<ListSchema> = Arc::new(self.config.schema()?);
        let config = Arc::new(self.config);
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryKeyValueStore::new()));
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(RecordFieldResolver));

        Ok(ListController {
            state: ListState::new(schema.clone(), config.clone(), resolver),
            scope: self.scope,
            preferences: PreferenceStore::new(storage.clone(), schema, config.clone()),
            cache: CacheStore::new(storage, config.key_prefix.clone()),
            config,
            source: self.source,
            remover: self.remover,
            prefs_loaded: false,
            generation: 0,
        })
    }
}
