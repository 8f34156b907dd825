//! The persisted view configuration bundle
//!
//! Stored documents are untrusted: every field is re-sanitized on load
//! against the current schema and configuration, independently of the
//! others, so one stale or corrupted field never discards the rest.

use crate::config::ListConfig;
use crate::core::columns::ColumnConfig;
use crate::core::field::ListSchema;
use crate::core::filter::{FilterCriterion, FilterLogic, FilterSet, SearchScope, new_criterion_id};
use crate::core::sort::{SortDirection, SortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Row height of the rendered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Comfortable,
}

impl Density {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "compact" => Some(Density::Compact),
            "comfortable" => Some(Density::Comfortable),
            _ => None,
        }
    }
}

/// Everything about the view a user expects to find again next time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub columns: ColumnConfig,
    pub sort: SortSpec,
    pub filters: FilterSet,
    pub search_scope: SearchScope,
    pub page_size: usize,
    pub density: Density,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedPreferences<'a> {
    column_order: &'a [String],
    visible_columns: Vec<String>,
    search_scope: &'a SearchScope,
    filter_logic: FilterLogic,
    filters: &'a [FilterCriterion],
    sort_field: &'a str,
    sort_direction: SortDirection,
    page_size: usize,
    density: Density,
}

impl Preferences {
    pub fn defaults(schema: &ListSchema, config: &ListConfig) -> Self {
        Self {
            columns: ColumnConfig::new(schema),
            sort: SortSpec::default_for(schema),
            filters: FilterSet::new(schema),
            search_scope: SearchScope::All,
            page_size: config.default_page_size,
            density: Density::default(),
        }
    }

    /// Persisted JSON shape
    pub fn to_value(&self) -> Value {
        let persisted = PersistedPreferences {
            column_order: self.columns.order(),
            visible_columns: self.columns.visible_columns(),
            search_scope: &self.search_scope,
            filter_logic: self.filters.logic(),
            filters: self.filters.criteria(),
            sort_field: &self.sort.field,
            sort_direction: self.sort.direction,
            page_size: self.page_size,
            density: self.density,
        };
        serde_json::to_value(persisted).unwrap_or(Value::Null)
    }

    /// Restore from a stored document, field by field
    pub fn from_value(doc: &Value, schema: &ListSchema, config: &ListConfig) -> Self {
        let str_field = |key: &str| doc.get(key).and_then(Value::as_str);
        let str_list = |key: &str| -> Vec<&str> {
            doc.get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default()
        };

        let columns = ColumnConfig::sanitized(
            str_list("columnOrder"),
            str_list("visibleColumns"),
            schema,
        );

        let sort = SortSpec::sanitized(
            str_field("sortField").unwrap_or_default(),
            str_field("sortDirection")
                .and_then(SortDirection::parse)
                .unwrap_or_default(),
            schema,
        );

        let logic = str_field("filterLogic")
            .and_then(FilterLogic::parse)
            .unwrap_or_default();
        let criteria = doc
            .get("filters")
            .and_then(Value::as_array)
            .map(|rows| sanitize_criteria(rows, schema))
            .unwrap_or_default();
        let filters = FilterSet::from_parts(logic, criteria, config.max_filters(), schema);

        let search_scope = str_field("searchScope")
            .map(|s| SearchScope::from(s.to_string()).sanitized(schema))
            .unwrap_or_default();

        let page_size = doc
            .get("pageSize")
            .and_then(Value::as_u64)
            .map(|n| config.sanitize_page_size(n as usize))
            .unwrap_or(config.default_page_size);

        let density = str_field("density")
            .and_then(Density::parse)
            .unwrap_or_default();

        Self {
            columns,
            sort,
            filters,
            search_scope,
            page_size,
            density,
        }
    }
}

fn scalar_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn sanitize_criteria(rows: &[Value], schema: &ListSchema) -> Vec<FilterCriterion> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| row.is_object())
        .map(|row| {
            let id = row
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.trim().is_empty() && !seen.contains(*id))
                .map(str::to_string)
                .unwrap_or_else(new_criterion_id);
            seen.insert(id.clone());

            FilterCriterion::sanitized(
                id,
                row.get("field").and_then(Value::as_str).unwrap_or_default(),
                row.get("operator").and_then(Value::as_str),
                &scalar_to_string(row.get("value")),
                schema,
            )
        })
        .collect()
}
