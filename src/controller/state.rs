//! Owned, synchronous list state and its derived view
//!
//! Every user action is a method on [`ListState`]. After each transition
//! the page is clamped into range and the selection is pruned to the
//! current (unfiltered) collection. The filtered, sorted and paginated
//! view is recomputed on demand by [`ListState::view`].

use crate::config::ListConfig;
use crate::controller::selection::Selection;
use crate::core::columns::ColumnMove;
use crate::core::error::ListError;
use crate::core::field::ListSchema;
use crate::core::filter::{FilterCriterion, FilterLogic, SearchScope, search_matches};
use crate::core::preferences::{Density, Preferences};
use crate::core::query::{PaginationMeta, clamp_page, paginate};
use crate::core::record::{FieldResolver, Record, normalize_snapshot};
use crate::core::sort::{SortSpec, sort_stable};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Structured notice for the rendering layer to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Network is offline and the cached snapshot is being shown
    ServingCache,
    /// A bulk delete finished; `removed < requested` means partial failure
    BulkDeleted { removed: usize, requested: usize },
}

/// Everything a rendering layer needs to draw the list
#[derive(Debug, Clone)]
pub struct ListView<R> {
    /// Records on the current page
    pub items: Vec<R>,
    pub pagination: PaginationMeta,
    /// Size of the unfiltered collection
    pub total_count: usize,
    /// Size of the collection after search and filters
    pub filtered_count: usize,
    pub visible_columns: Vec<String>,
    pub column_order: Vec<String>,
    pub sort: SortSpec,
    pub filters: Vec<FilterCriterion>,
    pub filter_logic: FilterLogic,
    pub filters_active: bool,
    pub search: String,
    pub search_scope: SearchScope,
    pub density: Density,
    pub page_sizes: Vec<usize>,
    pub selected_ids: Vec<String>,
    /// Every record of the current (non-empty) page is selected
    pub page_selected: bool,
    pub loading: bool,
    pub error: Option<ListError>,
    pub notices: Vec<Notice>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl<R> ListView<R> {
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(ListError::error_code)
    }
}

/// State of one list screen
pub struct ListState<R> {
    schema: Arc<ListSchema>,
    config: Arc<ListConfig>,
    resolver: Arc<dyn FieldResolver<R>>,
    prefs: Preferences,
    search: String,
    page: usize,
    /// None until the remote side has returned a payload (an empty one counts)
    live: Option<Vec<R>>,
    cached: Vec<R>,
    offline: bool,
    selection: Selection,
    loading: bool,
    error: Option<ListError>,
    notice: Option<Notice>,
    last_synced_at: Option<DateTime<Utc>>,
}

impl<R: Record> ListState<R> {
    pub fn new(
        schema: Arc<ListSchema>,
        config: Arc<ListConfig>,
        resolver: Arc<dyn FieldResolver<R>>,
    ) -> Self {
        let prefs = Preferences::defaults(&schema, &config);
        Self {
            schema,
            config,
            resolver,
            prefs,
            search: String::new(),
            page: 1,
            live: None,
            cached: Vec::new(),
            offline: false,
            selection: Selection::new(),
            loading: false,
            error: None,
            notice: None,
            last_synced_at: None,
        }
    }

    // === Accessors ===

    pub fn schema(&self) -> &ListSchema {
        &self.schema
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ListError> {
        self.error.as_ref()
    }

    pub fn has_live_payload(&self) -> bool {
        self.live.is_some()
    }

    /// Offline, nothing live yet: the cached snapshot is the item source
    pub fn is_serving_cache(&self) -> bool {
        self.live.is_none() && self.offline
    }

    /// Effective (unfiltered) item source
    pub fn items(&self) -> &[R] {
        match &self.live {
            Some(live) => live.as_slice(),
            None if self.offline => self.cached.as_slice(),
            None => &[],
        }
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.items().iter().find(|r| r.id() == id)
    }

    // === Derivation ===

    fn passes(&self, record: &R) -> bool {
        search_matches(
            record,
            &self.search,
            &self.prefs.search_scope,
            &self.schema,
            self.resolver.as_ref(),
        ) && self.prefs.filters.matches(record, self.resolver.as_ref())
    }

    fn filtered_count(&self) -> usize {
        self.items().iter().filter(|r| self.passes(r)).count()
    }

    /// Search, filter and sort the effective items
    pub fn ordered(&self) -> Vec<R> {
        let filtered: Vec<R> = self
            .items()
            .iter()
            .filter(|r| self.passes(r))
            .cloned()
            .collect();
        sort_stable(&filtered, &self.prefs.sort, &self.schema, self.resolver.as_ref())
    }

    /// Ids of the records on the current page
    pub fn page_ids(&self) -> Vec<String> {
        paginate(&self.ordered(), self.page, self.prefs.page_size)
            .items
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }

    pub fn view(&self) -> ListView<R> {
        let ordered = self.ordered();
        let filtered_count = ordered.len();
        let page = paginate(&ordered, self.page, self.prefs.page_size);
        let page_selected = self.selection.covers(page.items.iter().map(|r| r.id()));

        let mut notices = Vec::new();
        if self.is_serving_cache() {
            notices.push(Notice::ServingCache);
        }
        if let Some(notice) = &self.notice {
            notices.push(notice.clone());
        }

        ListView {
            items: page.items,
            pagination: page.meta,
            total_count: self.items().len(),
            filtered_count,
            visible_columns: self.prefs.columns.visible_columns(),
            column_order: self.prefs.columns.order().to_vec(),
            sort: self.prefs.sort.clone(),
            filters: self.prefs.filters.criteria().to_vec(),
            filter_logic: self.prefs.filters.logic(),
            filters_active: self.prefs.filters.is_active(),
            search: self.search.clone(),
            search_scope: self.prefs.search_scope.clone(),
            density: self.prefs.density,
            page_sizes: self.config.page_sizes.clone(),
            selected_ids: self.selection.ids().map(str::to_string).collect(),
            page_selected,
            loading: self.loading,
            error: self.error.clone(),
            notices,
            last_synced_at: self.last_synced_at,
        }
    }

    /// Re-establish the invariants after any transition
    fn reconcile(&mut self) {
        let clamped = clamp_page(self.page, self.filtered_count(), self.prefs.page_size);
        if clamped != self.page {
            tracing::debug!(from = self.page, to = clamped, "Clamped page");
            self.page = clamped;
        }

        let universe: HashSet<&str> = match &self.live {
            Some(live) => live.iter().map(|r| r.id()).collect(),
            None if self.offline => self.cached.iter().map(|r| r.id()).collect(),
            None => HashSet::new(),
        };
        let dropped = self.selection.retain_in(&universe);
        if dropped > 0 {
            tracing::debug!(dropped, "Pruned stale selections");
        }
    }

    /// A new query starts a new browse session on page 1
    fn restart(&mut self) {
        self.page = 1;
        self.reconcile();
    }

    // === Data ===

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Commit a live payload (an empty one is still a payload)
    pub fn receive_live(&mut self, records: Vec<R>) {
        self.live = Some(normalize_snapshot(records));
        self.error = None;
        self.last_synced_at = Some(Utc::now());
        self.reconcile();
    }

    pub fn receive_cache(&mut self, records: Vec<R>) {
        self.cached = normalize_snapshot(records);
        self.reconcile();
    }

    pub fn live_items(&self) -> Option<&[R]> {
        self.live.as_deref()
    }

    pub fn set_error(&mut self, error: ListError) {
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
        self.reconcile();
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Forget everything fetched or cached (scope change)
    pub fn reset_data(&mut self) {
        self.live = None;
        self.cached.clear();
        self.error = None;
        self.notice = None;
        self.loading = false;
        self.last_synced_at = None;
        self.selection.clear();
        self.page = 1;
    }

    // === Preferences ===

    pub fn apply_preferences(&mut self, prefs: Preferences) {
        self.prefs = prefs;
        self.restart();
    }

    pub fn reset_preferences(&mut self) {
        self.prefs = Preferences::defaults(&self.schema, &self.config);
        self.restart();
    }

    // === Search & filters ===

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
        self.restart();
    }

    pub fn set_search_scope(&mut self, scope: SearchScope) {
        self.prefs.search_scope = scope.sanitized(&self.schema);
        self.restart();
    }

    pub fn set_filter_field(&mut self, id: &str, field: &str) {
        if self.prefs.filters.set_field(id, field, &self.schema) {
            self.restart();
        }
    }

    pub fn set_filter_operator(&mut self, id: &str, operator: &str) {
        if self.prefs.filters.set_operator(id, operator, &self.schema) {
            self.restart();
        }
    }

    pub fn set_filter_value(&mut self, id: &str, value: &str) {
        if self.prefs.filters.set_value(id, value, &self.schema) {
            self.restart();
        }
    }

    pub fn set_filter_logic(&mut self, logic: FilterLogic) {
        self.prefs.filters.set_logic(logic);
        self.restart();
    }

    /// Append an empty filter row; None when the row limit is reached
    pub fn add_filter(&mut self) -> Option<String> {
        self.prefs
            .filters
            .add(self.config.max_filters(), &self.schema)
    }

    pub fn remove_filter(&mut self, id: &str) {
        if self.prefs.filters.remove(id, &self.schema) {
            self.restart();
        }
    }

    // === Sorting & paging ===

    /// Header click: same field flips direction, another field sorts ascending
    pub fn sort(&mut self, field: &str) {
        self.prefs.sort = self.prefs.sort.toggled(field, &self.schema);
        self.restart();
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.prefs.sort = SortSpec::sanitized(&spec.field, spec.direction, &self.schema);
        self.restart();
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
        self.reconcile();
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.prefs.page_size = self.config.sanitize_page_size(size);
        self.restart();
    }

    // === Columns & density ===

    pub fn toggle_column(&mut self, field: &str) -> bool {
        self.prefs.columns.toggle(field)
    }

    pub fn move_column(&mut self, field: &str, direction: ColumnMove) -> bool {
        self.prefs.columns.move_column(field, direction)
    }

    pub fn set_density(&mut self, density: Density) {
        self.prefs.density = density;
    }

    // === Selection ===

    pub fn toggle_selection(&mut self, id: &str) {
        if self.find(id).is_some() || self.selection.contains(id) {
            self.selection.toggle(id);
        }
    }

    pub fn toggle_current_page(&mut self, checked: bool) {
        let ids = self.page_ids();
        self.selection.set_page(ids.iter().map(String::as_str), checked);
    }

    pub fn deselect(&mut self, id: &str) {
        self.selection.remove(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}
