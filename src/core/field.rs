//! Field values and the list schema (the allow-lists every write is sanitized against)

use crate::core::error::ConfigError;
use crate::core::filter::FilterOperator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A polymorphic field value exposed by a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    /// Display string used for matching and ordering
    pub fn display(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Null => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// How a field is matched and ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text: contains / equals / startsWith
    Text,
    /// Boolean-like (active/inactive): is
    Flag,
}

impl FieldKind {
    /// Operators allowed for this kind, default first
    pub fn operators(self) -> &'static [FilterOperator] {
        match self {
            FieldKind::Text => &[
                FilterOperator::Contains,
                FilterOperator::Equals,
                FilterOperator::StartsWith,
            ],
            FieldKind::Flag => &[FilterOperator::Is],
        }
    }

    pub fn default_operator(self) -> FilterOperator {
        self.operators()[0]
    }

    pub fn allows(self, operator: FilterOperator) -> bool {
        self.operators().contains(&operator)
    }
}

/// Declaration of one field of the managed records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    pub kind: FieldKind,

    #[serde(default = "default_true")]
    pub sortable: bool,

    #[serde(default = "default_true")]
    pub searchable: bool,
}

fn default_true() -> bool {
    true
}

impl FieldDef {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            sortable: true,
            searchable: true,
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Flag,
            sortable: true,
            searchable: true,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// Ordered, validated set of fields known to a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSchema {
    fields: Vec<FieldDef>,
    primary: usize,
}

impl ListSchema {
    /// Validate a field list
    ///
    /// The first sortable text field becomes the primary (name-like) field,
    /// falling back to the first sortable field of any kind.
    pub fn new(fields: Vec<FieldDef>) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::EmptySchema);
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::DuplicateField(field.name.clone()));
            }
        }

        let primary = fields
            .iter()
            .position(|f| f.sortable && f.kind == FieldKind::Text)
            .or_else(|| fields.iter().position(|f| f.sortable))
            .ok_or(ConfigError::NoSortableField)?;

        Ok(Self { fields, primary })
    }

    /// Schema of the ward list screen
    pub fn wards() -> Self {
        Self {
            fields: vec![
                FieldDef::text("name"),
                FieldDef::text("tenant"),
                FieldDef::text("facility"),
                FieldDef::text("type"),
                FieldDef::flag("active"),
            ],
            primary: 0,
        }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field used when a sort or filter field is unknown
    pub fn primary(&self) -> &FieldDef {
        &self.fields[self.primary]
    }

    /// First declared field, the fallback for an unknown filter field
    pub fn first(&self) -> &FieldDef {
        &self.fields[0]
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(|f| f.kind)
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.sortable)
    }

    pub fn is_searchable(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.searchable)
    }
}
