//! Filter predicate engine and the free-text search predicate
//!
//! Criteria with an empty value are inert and match everything, so a
//! rendering layer can always show its filter rows without conditionals.
//! Field and operator validity is enforced when a criterion is written
//! (see [`FilterCriterion::sanitized`]), never at evaluation time.

use crate::core::field::ListSchema;
use crate::core::record::FieldResolver;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comparison applied by one criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    Equals,
    StartsWith,
    Is,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::Is => "is",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "contains" => Some(FilterOperator::Contains),
            "equals" => Some(FilterOperator::Equals),
            "startsWith" => Some(FilterOperator::StartsWith),
            "is" => Some(FilterOperator::Is),
            _ => None,
        }
    }
}

/// How the active criteria of a [`FilterSet`] combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    #[default]
    And,
    Or,
}

impl FilterLogic {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "AND" => Some(FilterLogic::And),
            "OR" => Some(FilterLogic::Or),
            _ => None,
        }
    }
}

/// Normalize a boolean-like token.
///
/// Returns None for anything that is neither true-ish nor false-ish.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "active" | "true" | "yes" | "on" | "enabled" | "1" => Some(true),
        "inactive" | "false" | "no" | "off" | "disabled" | "0" => Some(false),
        _ => None,
    }
}

/// A single field/operator/value test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub id: String,
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

/// Generate an id for a new filter row
pub fn new_criterion_id() -> String {
    format!("filter-{}", Uuid::new_v4().simple())
}

impl FilterCriterion {
    /// Build a criterion, falling back field by field to what the schema allows
    ///
    /// - unknown field: the schema's first field
    /// - unknown or disallowed operator: that field's default operator
    /// - value: trimmed
    pub fn sanitized(
        id: impl Into<String>,
        field: &str,
        operator: Option<&str>,
        value: &str,
        schema: &ListSchema,
    ) -> Self {
        let def = schema.get(field).unwrap_or_else(|| schema.first());
        let operator = operator
            .and_then(FilterOperator::parse)
            .filter(|op| def.kind.allows(*op))
            .unwrap_or_else(|| def.kind.default_operator());

        let id = id.into();
        Self {
            id: if id.trim().is_empty() {
                new_criterion_id()
            } else {
                id
            },
            field: def.name.clone(),
            operator,
            value: value.trim().to_string(),
        }
    }

    /// The inert criterion: first field, default operator, empty value
    pub fn inert(schema: &ListSchema) -> Self {
        let def = schema.first();
        Self {
            id: new_criterion_id(),
            field: def.name.clone(),
            operator: def.kind.default_operator(),
            value: String::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.value.is_empty()
    }

    /// Evaluate this criterion against one record
    pub fn matches<R>(&self, record: &R, resolver: &dyn FieldResolver<R>) -> bool {
        if self.value.is_empty() {
            return true;
        }

        let resolved = resolver.resolve(record, &self.field);
        let folded = || (resolved.to_lowercase(), self.value.to_lowercase());
        match self.operator {
            FilterOperator::Is => match parse_flag(&self.value) {
                Some(wanted) => parse_flag(&resolved) == Some(wanted),
                None => false,
            },
            FilterOperator::Contains => {
                let (haystack, needle) = folded();
                haystack.contains(&needle)
            }
            FilterOperator::Equals => {
                let (haystack, needle) = folded();
                haystack == needle
            }
            FilterOperator::StartsWith => {
                let (haystack, needle) = folded();
                haystack.starts_with(&needle)
            }
        }
    }
}

/// Ordered group of criteria combined with AND / OR
///
/// Never empty: removing the last criterion leaves one inert default behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    logic: FilterLogic,
    criteria: Vec<FilterCriterion>,
}

impl FilterSet {
    pub fn new(schema: &ListSchema) -> Self {
        Self {
            logic: FilterLogic::And,
            criteria: vec![FilterCriterion::inert(schema)],
        }
    }

    /// Assemble from already sanitized criteria, keeping at most `max`
    pub fn from_parts(
        logic: FilterLogic,
        mut criteria: Vec<FilterCriterion>,
        max: usize,
        schema: &ListSchema,
    ) -> Self {
        criteria.truncate(max.max(1));
        if criteria.is_empty() {
            criteria.push(FilterCriterion::inert(schema));
        }
        Self { logic, criteria }
    }

    pub fn logic(&self) -> FilterLogic {
        self.logic
    }

    pub fn criteria(&self) -> &[FilterCriterion] {
        &self.criteria
    }

    pub fn set_logic(&mut self, logic: FilterLogic) {
        self.logic = logic;
    }

    /// Whether any criterion actually constrains the result
    pub fn is_active(&self) -> bool {
        self.criteria.iter().any(FilterCriterion::is_active)
    }

    /// Append an inert row. Returns the new id, or None at capacity.
    pub fn add(&mut self, max: usize, schema: &ListSchema) -> Option<String> {
        if self.criteria.len() >= max {
            return None;
        }
        let criterion = FilterCriterion::inert(schema);
        let id = criterion.id.clone();
        self.criteria.push(criterion);
        Some(id)
    }

    /// Remove a row by id; returns whether anything was removed
    pub fn remove(&mut self, id: &str, schema: &ListSchema) -> bool {
        let Some(pos) = self.criteria.iter().position(|c| c.id == id) else {
            return false;
        };
        self.criteria.remove(pos);
        if self.criteria.is_empty() {
            self.criteria.push(FilterCriterion::inert(schema));
        }
        true
    }

    /// Change the field of a row; the operator is re-validated for the new field
    pub fn set_field(&mut self, id: &str, field: &str, schema: &ListSchema) -> bool {
        self.rewrite(id, schema, |c| {
            (field.to_string(), c.operator.as_str().to_string(), c.value.clone())
        })
    }

    /// Change the operator of a row; an operator the field does not allow
    /// falls back to the field's default
    pub fn set_operator(&mut self, id: &str, operator: &str, schema: &ListSchema) -> bool {
        self.rewrite(id, schema, |c| {
            (c.field.clone(), operator.to_string(), c.value.clone())
        })
    }

    pub fn set_value(&mut self, id: &str, value: &str, schema: &ListSchema) -> bool {
        self.rewrite(id, schema, |c| {
            (c.field.clone(), c.operator.as_str().to_string(), value.to_string())
        })
    }

    fn rewrite<F>(&mut self, id: &str, schema: &ListSchema, edit: F) -> bool
    where
        F: FnOnce(&FilterCriterion) -> (String, String, String),
    {
        let Some(slot) = self.criteria.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        let (field, operator, value) = edit(slot);
        *slot = FilterCriterion::sanitized(slot.id.clone(), &field, Some(&operator), &value, schema);
        true
    }

    /// Evaluate the whole set; inert criteria are ignored
    pub fn matches<R>(&self, record: &R, resolver: &dyn FieldResolver<R>) -> bool {
        let mut active = self.criteria.iter().filter(|c| c.is_active()).peekable();
        if active.peek().is_none() {
            return true;
        }
        match self.logic {
            FilterLogic::And => active.all(|c| c.matches(record, resolver)),
            FilterLogic::Or => active.any(|c| c.matches(record, resolver)),
        }
    }
}

/// Which fields the free-text search looks at
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchScope {
    #[default]
    All,
    Field(String),
}

impl From<String> for SearchScope {
    fn from(raw: String) -> Self {
        if raw == "all" {
            SearchScope::All
        } else {
            SearchScope::Field(raw)
        }
    }
}

impl From<SearchScope> for String {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::All => "all".to_string(),
            SearchScope::Field(f) => f,
        }
    }
}

impl SearchScope {
    /// Fall back to `All` when the scope names a field that cannot be searched
    pub fn sanitized(self, schema: &ListSchema) -> Self {
        match self {
            SearchScope::Field(f) if schema.is_searchable(&f) => SearchScope::Field(f),
            _ => SearchScope::All,
        }
    }
}

/// Free-text search, independent of the filter set
///
/// An empty (or whitespace) query matches everything.
pub fn search_matches<R>(
    record: &R,
    query: &str,
    scope: &SearchScope,
    schema: &ListSchema,
    resolver: &dyn FieldResolver<R>,
) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let contains = |field: &str| resolver.resolve(record, field).to_lowercase().contains(&needle);
    match scope {
        SearchScope::All => schema
            .fields()
            .iter()
            .filter(|f| f.searchable)
            .any(|f| contains(&f.name)),
        SearchScope::Field(field) => contains(field),
    }
}
