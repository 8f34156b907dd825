//! Integration tests for ListController driven through the mock backend

mod harness;

use harness::*;
use listview::prelude::*;
use std::time::Duration;

fn view_ids(c: &ListController<TestWard>) -> Vec<String> {
    c.view().items.into_iter().map(|w| w.id).collect()
}

fn selected(c: &ListController<TestWard>) -> Vec<String> {
    c.view().selected_ids
}

// ---------------------------------------------------------------------------
// Mounting and fetching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mount_fetches_first_page_and_caches_snapshot() {
    let backend = MockBackend::with_rows(wards(25));
    let storage = InMemoryKeyValueStore::new();
    let c = mounted_admin(&backend, &storage).await;

    let view = c.view();
    assert_eq!(view.total_count, 25);
    assert_eq!(view.items.len(), 10);
    assert_eq!(view.pagination.total_pages, 3);
    assert!(!view.loading);
    assert!(view.last_synced_at.is_some());

    let cached = storage.get("hms.wards.cache.u1.all").await.unwrap();
    assert!(cached.is_some_and(|raw| raw.contains("Ward 25")));
}

#[tokio::test]
async fn test_fetch_scoped_to_acting_tenant() {
    init_tracing();
    let backend = MockBackend::with_rows(vec![ward_in(1, "t1"), ward_in(2, "t2")]);
    let storage = InMemoryKeyValueStore::new();
    let mut c = controller(
        &backend,
        &storage,
        ListConfig::wards(),
        AccessScope::own_tenant("u7", "t2"),
    );
    c.mount().await;

    assert_eq!(backend.fetches()[0].tenant_id.as_deref(), Some("t2"));
    assert_eq!(view_ids(&c), vec!["2"]);
}

#[tokio::test]
async fn test_unresolved_scope_does_nothing() {
    init_tracing();
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = controller(
        &backend,
        &storage,
        ListConfig::wards(),
        AccessScope::unresolved(),
    );

    c.mount().await;
    c.sort("name").await;
    c.search("ward").await;

    assert!(backend.fetches().is_empty());
    assert!(storage.is_empty());
    assert!(!c.preferences_loaded());
    assert!(c.view().items.is_empty());
}

#[tokio::test]
async fn test_no_preference_write_before_mount() {
    init_tracing();
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = controller(
        &backend,
        &storage,
        ListConfig::wards(),
        AccessScope::all_tenants("u1"),
    );

    c.set_page_size(50).await;
    c.set_density(Density::Compact).await;
    assert!(storage.is_empty());

    c.mount().await;
    c.set_density(Density::Compact).await;
    assert!(storage.get("hms.wards.prefs.u1.all").await.unwrap().is_some());
}

#[tokio::test]
async fn test_search_does_not_write_preferences() {
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    c.search("ward 2").await;
    assert!(storage.get("hms.wards.prefs.u1.all").await.unwrap().is_none());

    c.set_page_size(20).await;
    let saved = storage.get("hms.wards.prefs.u1.all").await.unwrap().unwrap();
    assert!(!saved.contains("ward 2"));
}

// ---------------------------------------------------------------------------
// Query state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_resets_page() {
    let backend = MockBackend::with_rows(wards(25));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    c.set_page(3);
    assert_eq!(c.view().pagination.page, 3);

    c.search("ward 1").await;
    let view = c.view();
    assert_eq!(view.pagination.page, 1);
    assert_eq!(view.filtered_count, 11);
}

#[tokio::test]
async fn test_page_clamped_to_last_page() {
    let backend = MockBackend::with_rows(wards(25));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    c.set_page(99);
    assert_eq!(c.view().pagination.page, 3);
    assert_eq!(view_ids(&c).len(), 5);
}

#[tokio::test]
async fn test_filters_combine_with_or() {
    let backend = MockBackend::with_rows(wards(12));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    let first = c.view().filters[0].id.clone();
    c.set_filter_field(&first, "type").await;
    c.set_filter_operator(&first, "equals").await;
    c.set_filter_value(&first, "icu").await;
    assert_eq!(c.view().filtered_count, 4);

    let second = c.add_filter().await.unwrap();
    c.set_filter_field(&second, "name").await;
    c.set_filter_value(&second, "ward 1").await;
    assert_eq!(c.view().filtered_count, 1, "AND: ward 12 is the only ICU ward 1x");

    c.set_filter_logic(FilterLogic::Or).await;
    assert_eq!(c.view().filtered_count, 4 + 4 - 1);

    c.remove_filter(&first).await;
    c.remove_filter(&second).await;
    let view = c.view();
    assert_eq!(view.filters.len(), 1);
    assert!(!view.filters_active);
    assert_eq!(view.filtered_count, 12);
}

#[tokio::test]
async fn test_header_click_toggles_direction() {
    let backend = MockBackend::with_rows(wards(12));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    assert_eq!(&view_ids(&c)[..3], &["1", "2", "3"]);

    c.sort("name").await;
    assert_eq!(c.view().sort.direction, SortDirection::Desc);
    assert_eq!(&view_ids(&c)[..3], &["12", "11", "10"]);

    c.sort("active").await;
    let view = c.view();
    assert_eq!(view.sort.field, "active");
    assert_eq!(view.sort.direction, SortDirection::Asc);
    assert_eq!(&view_ids(&c)[..3], &["2", "4", "6"]);
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_preferences_restored_on_remount() {
    let backend = MockBackend::with_rows(wards(30));
    let storage = InMemoryKeyValueStore::new();
    {
        let mut c = mounted_admin(&backend, &storage).await;
        c.sort("name").await;
        c.set_page_size(20).await;
        c.toggle_column("tenant").await;
        c.move_column("facility", ColumnMove::Earlier).await;
        c.search("ward 2").await;
    }

    let c = mounted_admin(&backend, &storage).await;
    let view = c.view();
    assert_eq!(view.sort.direction, SortDirection::Desc);
    assert_eq!(view.pagination.page_size, 20);
    assert_eq!(view.visible_columns, vec!["name", "facility", "type", "active"]);
    assert_eq!(view.search, "", "search text is not persisted");
}

#[tokio::test]
async fn test_corrupted_preference_field_falls_back_alone() {
    let backend = MockBackend::with_rows(wards(30));
    let storage = InMemoryKeyValueStore::new();
    storage
        .set(
            "hms.wards.prefs.u1.all",
            r#"{"sortField":"name","sortDirection":"sideways","pageSize":20,"density":"compact"}"#
                .to_string(),
        )
        .await
        .unwrap();

    let c = mounted_admin(&backend, &storage).await;
    let view = c.view();
    assert_eq!(view.sort.field, "name");
    assert_eq!(view.sort.direction, SortDirection::Asc);
    assert_eq!(view.pagination.page_size, 20);
    assert_eq!(view.density, Density::Compact);
}

#[tokio::test]
async fn test_preferences_partitioned_by_scope() {
    let backend = MockBackend::with_rows(wards(5));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;
    c.set_page_size(50).await;

    c.set_scope(AccessScope::own_tenant("u1", "t1")).await;
    assert_eq!(c.view().pagination.page_size, 10);

    c.set_scope(AccessScope::all_tenants("u1")).await;
    assert_eq!(c.view().pagination.page_size, 50);
}

// ---------------------------------------------------------------------------
// Failures, offline and cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_offline_serves_cached_snapshot() {
    let storage = InMemoryKeyValueStore::new();
    mounted_admin(&MockBackend::with_rows(wards(12)), &storage).await;

    let backend = MockBackend::with_rows(wards(12));
    backend.script(Err(RemoteError::new("NETWORK_UNAVAILABLE")));
    let mut c = controller(
        &backend,
        &storage,
        ListConfig::wards(),
        AccessScope::all_tenants("u1"),
    );
    c.set_offline(true);
    c.mount().await;

    let view = c.view();
    assert_eq!(view.error_code(), Some("NETWORK_UNAVAILABLE"));
    assert_eq!(view.total_count, 12);
    assert!(view.notices.contains(&Notice::ServingCache));

    c.retry().await;
    let view = c.view();
    assert!(view.error.is_none());
    assert!(!view.notices.contains(&Notice::ServingCache));
    assert_eq!(view.total_count, 12);
}

#[tokio::test]
async fn test_online_failure_shows_no_cache() {
    let storage = InMemoryKeyValueStore::new();
    mounted_admin(&MockBackend::with_rows(wards(12)), &storage).await;

    let backend = MockBackend::default();
    backend.script(Err(RemoteError::new("HTTP_500")));
    let mut c = controller(
        &backend,
        &storage,
        ListConfig::wards(),
        AccessScope::all_tenants("u1"),
    );
    c.mount().await;

    let view = c.view();
    assert_eq!(view.error_code(), Some("HTTP_500"));
    assert_eq!(view.total_count, 0);
    assert!(view.notices.is_empty());
}

#[tokio::test]
async fn test_fetch_timeout_surfaces_error() {
    init_tracing();
    let backend = MockBackend::with_rows(wards(3));
    backend.delay_fetches(Duration::from_millis(500));
    let storage = InMemoryKeyValueStore::new();
    let config = ListConfig {
        fetch_timeout_ms: Some(20),
        ..ListConfig::wards()
    };
    let mut c = controller(&backend, &storage, config, AccessScope::all_tenants("u1"));
    c.mount().await;

    let view = c.view();
    assert_eq!(view.error_code(), Some("FETCH_TIMEOUT"));
    assert!(!view.loading);
    assert!(view.items.is_empty());
}

#[tokio::test]
async fn test_superseded_fetch_is_dropped() {
    let backend = MockBackend::with_rows(vec![ward_in(1, "t1"), ward_in(2, "t2")]);
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    let stale = c.begin_refresh().unwrap();
    c.set_scope(AccessScope::own_tenant("u2", "t2")).await;

    let outcome = stale.run().await;
    assert_eq!(outcome.result().as_ref().map(Vec::len).ok(), Some(2));
    assert!(!c.complete_refresh(outcome).await);
    assert_eq!(view_ids(&c), vec!["2"]);
}

#[tokio::test]
async fn test_overlapping_refresh_only_latest_commits() {
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    let older = c.begin_refresh().unwrap().run().await;
    backend.set_rows(wards(7));
    let newer = c.begin_refresh().unwrap();
    assert!(c.view().loading);

    assert!(!c.complete_refresh(older).await);
    assert!(c.view().loading, "the newer fetch is still in flight");

    assert!(c.complete_refresh(newer.run().await).await);
    let view = c.view();
    assert!(!view.loading);
    assert_eq!(view.total_count, 7);

    let cached = storage.get("hms.wards.cache.u1.all").await.unwrap();
    assert!(cached.is_some_and(|raw| raw.contains("Ward 7")));
}

#[tokio::test]
async fn test_retry_supersedes_pending_fetch() {
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    let pending = c.begin_refresh().unwrap().run().await;
    backend.set_rows(wards(7));
    c.retry().await;
    assert_eq!(c.view().total_count, 7);

    assert!(!c.complete_refresh(pending).await);
    assert_eq!(c.view().total_count, 7);
}

#[tokio::test]
async fn test_unmount_drops_in_flight_fetch() {
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    let task = c.begin_refresh().unwrap();
    backend.set_rows(wards(1));
    c.unmount();

    assert!(!c.complete_refresh(task.run().await).await);
    assert_eq!(c.view().total_count, 3);
    assert!(!c.view().loading);
}

// ---------------------------------------------------------------------------
// Selection and bulk delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_selection_pruned_after_refetch() {
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;
    for id in ["1", "2", "3"] {
        c.toggle_selection(id);
    }

    backend.set_rows(vec![ward(2), ward(3), ward(4)]);
    c.refresh().await;
    assert_eq!(selected(&c), vec!["2", "3"]);
}

#[tokio::test]
async fn test_selection_spans_pages() {
    let backend = MockBackend::with_rows(wards(25));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;

    c.toggle_current_page(true);
    c.set_page(2);
    c.toggle_current_page(true);
    assert_eq!(selected(&c).len(), 20);
    assert!(c.view().page_selected);

    c.set_page(3);
    assert!(!c.view().page_selected);

    c.clear_selection();
    assert!(selected(&c).is_empty());
}

#[tokio::test]
async fn test_bulk_delete_continues_past_failures() {
    let backend = MockBackend::with_rows(wards(3));
    backend.reject_delete("2");
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;
    for id in ["1", "2", "3"] {
        c.toggle_selection(id);
    }

    let report = c.bulk_delete().await;
    assert_eq!(
        report,
        BulkDeleteReport {
            requested: 3,
            removed: 2,
            failed: 1,
            skipped: 0,
        }
    );
    assert_eq!(backend.deletes(), vec!["1", "2", "3"]);

    let view = c.view();
    assert!(view.notices.contains(&Notice::BulkDeleted {
        removed: 2,
        requested: 3,
    }));
    assert_eq!(view.total_count, 1);
    assert_eq!(view.selected_ids, vec!["2"]);

    c.dismiss_notice();
    assert!(c.view().notices.is_empty());
}

#[tokio::test]
async fn test_concurrent_bulk_delete_continues_past_failures() {
    init_tracing();
    let backend = MockBackend::with_rows(wards(5));
    backend.reject_delete("2");
    backend.fail_delete("4");
    let storage = InMemoryKeyValueStore::new();
    let config = ListConfig {
        delete_concurrency: 3,
        ..ListConfig::wards()
    };
    let mut c = controller(&backend, &storage, config, AccessScope::all_tenants("u1"));
    c.mount().await;
    c.toggle_current_page(true);

    let report = c.bulk_delete().await;
    assert_eq!(
        report,
        BulkDeleteReport {
            requested: 5,
            removed: 3,
            failed: 2,
            skipped: 0,
        }
    );

    let mut attempted = backend.deletes();
    attempted.sort();
    assert_eq!(attempted, vec!["1", "2", "3", "4", "5"]);

    let view = c.view();
    assert_eq!(view.total_count, 2);
    assert_eq!(view.selected_ids, vec!["2", "4"]);
}

#[tokio::test]
async fn test_bulk_delete_error_counts_as_failure() {
    let backend = MockBackend::with_rows(wards(2));
    backend.fail_delete("1");
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;
    c.toggle_current_page(true);

    let report = c.bulk_delete().await;
    assert_eq!(report.removed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(selected(&c), vec!["1"]);
}

#[tokio::test]
async fn test_bulk_delete_skips_records_outside_tenant() {
    init_tracing();
    let mut stray = ward_in(4, "t1");
    stray.tenant = None;
    let backend = MockBackend::with_rows(vec![ward_in(1, "t1"), ward_in(2, "t1")]);
    backend.script(Ok(vec![
        ward_in(1, "t1"),
        ward_in(2, "t1"),
        ward_in(3, "t2"),
        stray,
    ]));
    let storage = InMemoryKeyValueStore::new();
    let mut c = controller(
        &backend,
        &storage,
        ListConfig::wards(),
        AccessScope::own_tenant("u5", "t1"),
    );
    c.mount().await;
    c.toggle_current_page(true);
    assert_eq!(selected(&c).len(), 4);

    let report = c.bulk_delete().await;
    assert_eq!(report.skipped, 2);
    assert_eq!(report.removed, 2);
    assert_eq!(backend.deletes(), vec!["1", "2"]);
}

#[tokio::test]
async fn test_bulk_delete_with_empty_selection_is_noop() {
    let backend = MockBackend::with_rows(wards(3));
    let storage = InMemoryKeyValueStore::new();
    let mut c = mounted_admin(&backend, &storage).await;
    let fetches = backend.fetches().len();

    assert_eq!(c.bulk_delete().await, BulkDeleteReport::default());
    assert!(backend.deletes().is_empty());
    assert_eq!(backend.fetches().len(), fetches);
}
