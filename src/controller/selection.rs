//! Cross-page selection set

use indexmap::IndexSet;
use std::collections::HashSet;

/// Selected record ids, in the order they were selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Flip one id
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.shift_remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Add (`checked`) or remove exactly the given page's ids
    ///
    /// Ids selected on other pages are left alone.
    pub fn set_page<'a, I>(&mut self, page_ids: I, checked: bool)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in page_ids {
            if checked {
                self.ids.insert(id.to_string());
            } else {
                self.ids.shift_remove(id);
            }
        }
    }

    /// Whether every id of a non-empty page is selected
    pub fn covers<'a, I>(&self, page_ids: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any = false;
        for id in page_ids {
            if !self.ids.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.shift_remove(id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that are not part of `universe`; returns how many were dropped
    pub fn retain_in(&mut self, universe: &HashSet<&str>) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| universe.contains(id.as_str()));
        before - self.ids.len()
    }
}
