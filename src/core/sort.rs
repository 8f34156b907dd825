//! Sort engine: stable, case-insensitive, numeric-aware ordering
//!
//! Stability does not rely on the host sort being stable. Every record is
//! decorated with its input index, which is the final tie-break, and
//! descending order negates the comparator instead of reversing the output.

use crate::core::field::{FieldKind, ListSchema};
use crate::core::filter::parse_flag;
use crate::core::record::FieldResolver;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending on the schema's primary field
    pub fn default_for(schema: &ListSchema) -> Self {
        Self {
            field: schema.primary().name.clone(),
            direction: SortDirection::Asc,
        }
    }

    /// Build a spec, replacing a non-sortable field with the primary field
    pub fn sanitized(field: &str, direction: SortDirection, schema: &ListSchema) -> Self {
        let field = if schema.is_sortable(field) {
            field.to_string()
        } else {
            schema.primary().name.clone()
        };
        Self { field, direction }
    }

    /// Header-click rule: same field flips direction, a new field starts ascending
    pub fn toggled(&self, field: &str, schema: &ListSchema) -> Self {
        if self.field == field {
            Self {
                field: self.field.clone(),
                direction: self.direction.flipped(),
            }
        } else {
            Self::sanitized(field, SortDirection::Asc, schema)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk {
    Digits(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SortKey {
    Flag(u8),
    Text(Vec<Chunk>),
}

fn chunk_regex() -> &'static Regex {
    static CHUNKS: OnceLock<Regex> = OnceLock::new();
    CHUNKS.get_or_init(|| Regex::new(r"\d+|\D+").expect("static regex compiles"))
}

/// Strip diacritics so `Émile` orders next to `Emile`, not after `z`
fn fold_accents(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn text_key(value: &str) -> Vec<Chunk> {
    let folded = fold_accents(value);
    chunk_regex()
        .find_iter(&folded)
        .map(|m| {
            let s = m.as_str();
            if s.as_bytes()[0].is_ascii_digit() {
                let trimmed = s.trim_start_matches('0');
                Chunk::Digits(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
            } else {
                Chunk::Text(s.to_lowercase())
            }
        })
        .collect()
}

fn compare_chunks(a: &[Chunk], b: &[Chunk]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
            (Chunk::Digits(x), Chunk::Text(y)) | (Chunk::Text(x), Chunk::Digits(y)) => {
                x.as_str().cmp(y.as_str())
            }
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Case- and accent-insensitive comparison where digit runs compare by numeric value
///
/// `"Ward 2" < "ward 10"`, `"Émile" < "Fatima"`. Beyond folding accents the
/// order is code-point order, not a locale collation.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare_chunks(&text_key(a), &text_key(b))
}

fn sort_key(value: &str, kind: FieldKind) -> SortKey {
    match kind {
        FieldKind::Flag => SortKey::Flag(match parse_flag(value) {
            Some(true) => 0,
            Some(false) => 1,
            None => 2,
        }),
        FieldKind::Text => SortKey::Text(text_key(value)),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Flag(x), SortKey::Flag(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => compare_chunks(x, y),
        (SortKey::Flag(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Flag(_)) => Ordering::Greater,
    }
}

/// Order records by `spec`; ties keep their input order in both directions
pub fn sort_stable<R: Clone>(
    records: &[R],
    spec: &SortSpec,
    schema: &ListSchema,
    resolver: &dyn FieldResolver<R>,
) -> Vec<R> {
    let kind = schema.kind_of(&spec.field).unwrap_or(FieldKind::Text);
    let mut decorated: Vec<(usize, SortKey)> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (index, sort_key(&resolver.resolve(record, &spec.field), kind)))
        .collect();

    decorated.sort_unstable_by(|(ia, ka), (ib, kb)| {
        spec.direction
            .apply(compare_keys(ka, kb))
            .then_with(|| ia.cmp(ib))
    });

    decorated
        .into_iter()
        .map(|(index, _)| records[index].clone())
        .collect()
}
