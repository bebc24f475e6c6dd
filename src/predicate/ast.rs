//! Predicate intermediate representation
//!
//! Built by `PredicateBuilder`, then either compiled by a storage adapter
//! (see `source::SqlQuery`) or evaluated directly against in-memory records.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::shape::FieldKind;
use crate::value::{FieldValue, Record};

/// Comparison operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// field = value
    Eq,
    /// field > value
    Gt,
    /// field >= value
    Ge,
    /// field < value
    Lt,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
        }
    }
}

/// A boolean condition over one record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    Always,
    /// Matches no record
    Never,
    /// Typed comparison of a field against a constant
    Compare {
        field: String,
        kind: FieldKind,
        op: CompareOp,
        value: FieldValue,
    },
    /// Case-sensitive substring test on a text field
    Contains { field: String, needle: String },
    /// Half-open date range `[start, end)`
    Between {
        field: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(
        field: impl Into<String>,
        kind: FieldKind,
        op: CompareOp,
        value: impl Into<FieldValue>,
    ) -> Self {
        Predicate::Compare {
            field: field.into(),
            kind,
            op,
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn between(field: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Predicate::Between {
            field: field.into(),
            start,
            end,
        }
    }

    /// Returns true for the neutral predicate
    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    /// Conjunction; `Always` is the identity and `Never` absorbs.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Always, p) | (p, Predicate::Always) => p,
            (Predicate::Never, _) | (_, Predicate::Never) => Predicate::Never,
            (Predicate::And(mut a), Predicate::And(b)) => {
                a.extend(b);
                Predicate::And(a)
            }
            (Predicate::And(mut a), p) => {
                a.push(p);
                Predicate::And(a)
            }
            (p, Predicate::And(mut b)) => {
                b.insert(0, p);
                Predicate::And(b)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }

    /// Disjunction; `Never` is the identity and `Always` absorbs.
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Never, p) | (p, Predicate::Never) => p,
            (Predicate::Always, _) | (_, Predicate::Always) => Predicate::Always,
            (Predicate::Or(mut a), Predicate::Or(b)) => {
                a.extend(b);
                Predicate::Or(a)
            }
            (Predicate::Or(mut a), p) => {
                a.push(p);
                Predicate::Or(a)
            }
            (p, Predicate::Or(mut b)) => {
                b.insert(0, p);
                Predicate::Or(b)
            }
            (a, b) => Predicate::Or(vec![a, b]),
        }
    }

    /// Negation
    pub fn not(self) -> Predicate {
        match self {
            Predicate::Always => Predicate::Never,
            Predicate::Never => Predicate::Always,
            Predicate::Not(inner) => *inner,
            p => Predicate::Not(Box::new(p)),
        }
    }

    /// Folds an iterator with `and`, starting from `Always`
    pub fn all<I: IntoIterator<Item = Predicate>>(predicates: I) -> Predicate {
        predicates.into_iter().fold(Predicate::Always, Predicate::and)
    }

    /// Folds an iterator with `or`, starting from `Never`
    pub fn any<I: IntoIterator<Item = Predicate>>(predicates: I) -> Predicate {
        predicates.into_iter().fold(Predicate::Never, Predicate::or)
    }

    /// Evaluates the predicate against one record.
    ///
    /// A missing or null field value never satisfies a comparison, so its
    /// negation does.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::Compare {
                field,
                kind,
                op,
                value,
            } => match typed_value(record, field, kind) {
                Some(actual) => actual
                    .compare(value)
                    .map_or(false, |ordering| op.accepts(ordering)),
                None => false,
            },
            Predicate::Contains { field, needle } => {
                match typed_value(record, field, &FieldKind::Text) {
                    Some(FieldValue::Text(text)) => text.contains(needle.as_str()),
                    _ => false,
                }
            }
            Predicate::Between { field, start, end } => {
                match typed_value(record, field, &FieldKind::Date) {
                    Some(FieldValue::Date(d)) => *start <= d && d < *end,
                    _ => false,
                }
            }
            Predicate::Not(inner) => !inner.evaluate(record),
            Predicate::And(parts) => parts.iter().all(|p| p.evaluate(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.evaluate(record)),
        }
    }
}

/// Reads `field` and coerces it to `kind`; None for missing, null or unreadable values.
fn typed_value<R: Record + ?Sized>(record: &R, field: &str, kind: &FieldKind) -> Option<FieldValue> {
    record
        .value(field)
        .and_then(|v| v.coerce(kind))
        .filter(|v| !v.is_null())
}
