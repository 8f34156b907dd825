//! Query parameters for the remote listing call, and pagination utilities

use serde::{Deserialize, Serialize};

/// Scope filters handed to [`RecordSource::fetch_page`](crate::core::service::RecordSource::fetch_page)
///
/// Filtering, sorting and paging all happen client-side, so the only
/// parameters the remote side sees are the tenant-scoping ones.
///
/// # Example
/// ```rust,ignore
/// // Acting user manages all tenants
/// QueryParams { tenant_id: None }
///
/// // Acting user is scoped to its own tenant
/// QueryParams { tenant_id: Some("tenant-7".into()) }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryParams {
    /// Restrict the listing to this tenant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// One page sliced out of an ordered sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// Pagination metadata
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1, clamped into range)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after search and filters)
    pub total: usize,

    /// Total number of pages, never less than 1
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

/// `max(1, ceil(total / page_size))`
pub fn total_pages(total: usize, page_size: usize) -> usize {
    // Ensure page size is at least 1 to avoid division by zero
    total.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total, page_size))
}

impl PaginationMeta {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(total, page_size);
        let page = page.clamp(1, total_pages);

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Slice an already filtered and sorted sequence into the requested page
pub fn paginate<T: Clone>(ordered: &[T], page: usize, page_size: usize) -> Page<T> {
    let meta = PaginationMeta::new(page, page_size, ordered.len());
    let start = (meta.page - 1) * meta.page_size;
    let end = (start + meta.page_size).min(ordered.len());

    Page {
        items: ordered.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        meta,
    }
}
