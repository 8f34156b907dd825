//! Column order and visibility

use crate::core::field::ListSchema;
use indexmap::IndexSet;

/// Direction for [`ColumnConfig::move_column`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMove {
    Earlier,
    Later,
}

/// Column layout of a list
///
/// `order` is always a permutation of every schema field and `visible` is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConfig {
    order: Vec<String>,
    visible: IndexSet<String>,
}

impl ColumnConfig {
    /// Schema order, everything visible
    pub fn new(schema: &ListSchema) -> Self {
        let order: Vec<String> = schema.field_names().map(str::to_string).collect();
        let visible = order.iter().cloned().collect();
        Self { order, visible }
    }

    /// Rebuild from possibly stale or corrupted lists
    ///
    /// Unknown and repeated entries are dropped, missing fields are appended
    /// in schema order. An empty visible set falls back to all columns.
    pub fn sanitized<'a, O, V>(order: O, visible: V, schema: &ListSchema) -> Self
    where
        O: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let mut seen: IndexSet<String> = order
            .into_iter()
            .filter(|f| schema.contains(f))
            .map(str::to_string)
            .collect();
        for field in schema.field_names() {
            seen.insert(field.to_string());
        }
        let order: Vec<String> = seen.into_iter().collect();

        let visible: IndexSet<String> = visible
            .into_iter()
            .filter(|f| schema.contains(f))
            .map(str::to_string)
            .collect();
        if visible.is_empty() {
            return Self {
                visible: order.iter().cloned().collect(),
                order,
            };
        }
        Self { order, visible }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn is_visible(&self, field: &str) -> bool {
        self.visible.contains(field)
    }

    /// Visible columns in display order
    pub fn visible_columns(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|f| self.visible.contains(f.as_str()))
            .cloned()
            .collect()
    }

    /// Show or hide a column. Hiding the last visible column is a no-op.
    pub fn toggle(&mut self, field: &str) -> bool {
        if !self.order.iter().any(|f| f == field) {
            return false;
        }
        if self.visible.contains(field) {
            if self.visible.len() == 1 {
                return false;
            }
            self.visible.shift_remove(field);
        } else {
            self.visible.insert(field.to_string());
        }
        true
    }

    /// Swap a column with its neighbour
    pub fn move_column(&mut self, field: &str, direction: ColumnMove) -> bool {
        let Some(index) = self.order.iter().position(|f| f == field) else {
            return false;
        };
        let target = match direction {
            ColumnMove::Earlier if index > 0 => index - 1,
            ColumnMove::Later if index + 1 < self.order.len() => index + 1,
            _ => return false,
        };
        self.order.swap(index, target);
        true
    }
}
