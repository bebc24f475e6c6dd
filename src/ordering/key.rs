//! Sort keys and in-memory sorting

use std::cmp::Ordering;

use crate::request::SortDirection;
use crate::shape::FieldKind;
use crate::value::{FieldValue, Record};

/// One ordering step: field, declared kind, direction
#[derive(Debug, Clone, PartialEq)]
pub struct OrderKey {
    pub field: String,
    pub kind: FieldKind,
    pub direction: SortDirection,
}

impl OrderKey {
    pub fn new(field: impl Into<String>, kind: FieldKind, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            kind,
            direction,
        }
    }

    /// Typed sort value of `record` for this key. Missing and unreadable values are null.
    pub fn extract<R: Record + ?Sized>(&self, record: &R) -> FieldValue {
        record
            .value(&self.field)
            .and_then(|v| v.coerce(&self.kind))
            .unwrap_or(FieldValue::Null)
    }

    /// Compares two records on this key; nulls first when ascending.
    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        self.compare_values(&self.extract(a), &self.extract(b))
    }

    fn compare_values(&self, a: &FieldValue, b: &FieldValue) -> Ordering {
        let ordering = a.sort_cmp(b, &self.kind);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Lexicographic comparison over several keys; the first key is primary.
pub fn compare_by<R: Record + ?Sized>(keys: &[OrderKey], a: &R, b: &R) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Stable sort of `records` by `keys`.
///
/// Sort values are extracted once per record before sorting.
pub fn sort_records<R: Record>(records: Vec<R>, keys: &[OrderKey]) -> Vec<R> {
    if keys.is_empty() {
        return records;
    }

    let mut decorated: Vec<(Vec<FieldValue>, R)> = records
        .into_iter()
        .map(|r| (keys.iter().map(|k| k.extract(&r)).collect(), r))
        .collect();

    decorated.sort_by(|(a, _), (b, _)| {
        keys.iter()
            .zip(a.iter().zip(b.iter()))
            .map(|(key, (va, vb))| key.compare_values(va, vb))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    decorated.into_iter().map(|(_, r)| r).collect()
}
