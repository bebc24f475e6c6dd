//! Per-type, per-operator predicate construction
//!
//! Construction never fails. Every failure is an explicit `Neutral` outcome
//! that contributes `Predicate::Always` and is logged.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use super::ast::{CompareOp, Predicate};
use super::target::{Neutral, Target};
use crate::config::ManagerConfig;
use crate::request::{Filter, FilterOperator};
use crate::shape::{FieldKind, RecordShape};
use crate::value::{parse_bool, parse_decimal, parse_float, FieldValue};

/// Result of building one filter
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Built(Predicate),
    Neutral(Neutral),
}

impl Outcome {
    pub fn into_predicate(self) -> Predicate {
        match self {
            Outcome::Built(p) => p,
            Outcome::Neutral(_) => Predicate::Always,
        }
    }
}

/// Turns `Filter` descriptors into typed predicates
#[derive(Debug, Clone, Default)]
pub struct PredicateBuilder {
    config: ManagerConfig,
}

impl PredicateBuilder {
    pub fn new(config: ManagerConfig) -> Self {
        Self { config }
    }

    /// Builds the predicate for one filter, `Always` when it cannot apply.
    pub fn build(&self, model: &RecordShape, target: Target<'_>, filter: &Filter) -> Predicate {
        match self.outcome(model, target, filter) {
            Outcome::Built(p) => p,
            Outcome::Neutral(reason) => {
                if reason.is_expected() {
                    debug!(member = %filter.member, %reason, "filter skipped");
                } else {
                    warn!(
                        member = %filter.member,
                        operator = filter.operator.as_str(),
                        %reason,
                        "filter ignored"
                    );
                }
                Predicate::Always
            }
        }
    }

    /// Like `build`, reporting why a filter contributes nothing.
    pub fn outcome(&self, model: &RecordShape, target: Target<'_>, filter: &Filter) -> Outcome {
        let Some(class) = model.resolve(&filter.member) else {
            return Outcome::Neutral(Neutral::UnknownMember);
        };
        let field = match target.address(&class) {
            Ok(field) => field,
            Err(reason) => return Outcome::Neutral(reason),
        };

        let result = match class.kind {
            FieldKind::Text => text_predicate(field, filter),
            FieldKind::Date => self.date_predicate(field, filter),
            kind => scalar_predicate(field, kind, filter),
        };

        match result {
            Ok(p) => Outcome::Built(p),
            Err(reason) => Outcome::Neutral(reason),
        }
    }

    /// Calendar-day semantics: Equal is `[d, d+1)`, GreaterThan is `>= d+1`,
    /// LessThan is `< d`.
    fn date_predicate(&self, field: String, filter: &Filter) -> Result<Predicate, Neutral> {
        let raw = filter.value.as_deref().ok_or(Neutral::MissingValue)?;
        let unparseable = || Neutral::Unparseable {
            kind: "date",
            raw: raw.to_string(),
        };

        // Round-trip rejects unpadded parts and surrounding whitespace.
        let date = NaiveDate::parse_from_str(raw, &self.config.date_format)
            .ok()
            .filter(|d| d.format(&self.config.date_format).to_string() == raw)
            .ok_or_else(unparseable)?;
        let next = date.succ_opt().ok_or_else(unparseable)?;
        let start = date.and_time(NaiveTime::MIN);
        let end = next.and_time(NaiveTime::MIN);

        Ok(match filter.operator {
            FilterOperator::NotEqual => Predicate::between(field, start, end).not(),
            FilterOperator::GreaterThan => {
                Predicate::compare(field, FieldKind::Date, CompareOp::Ge, end)
            }
            FilterOperator::LessThan => {
                Predicate::compare(field, FieldKind::Date, CompareOp::Lt, start)
            }
            _ => Predicate::between(field, start, end),
        })
    }
}

fn text_predicate(field: String, filter: &Filter) -> Result<Predicate, Neutral> {
    let value = match filter.value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(Neutral::BlankText),
    };

    let compare = |op| Predicate::compare(field.clone(), FieldKind::Text, op, value);
    Ok(match filter.operator {
        FilterOperator::Equal => compare(CompareOp::Eq),
        FilterOperator::NotEqual => compare(CompareOp::Eq).not(),
        FilterOperator::Contains => Predicate::contains(field.clone(), value),
        FilterOperator::NotContains => Predicate::contains(field.clone(), value).not(),
        FilterOperator::GreaterThan => compare(CompareOp::Gt),
        FilterOperator::LessThan => compare(CompareOp::Lt),
    })
}

/// Boolean, numeric and enumeration fields.
///
/// Operators a kind does not support fall through to Equal.
fn scalar_predicate(field: String, kind: &FieldKind, filter: &Filter) -> Result<Predicate, Neutral> {
    let raw = filter.value.as_deref().ok_or(Neutral::MissingValue)?;
    let value = parse_value(kind, raw).ok_or_else(|| Neutral::Unparseable {
        kind: kind.type_name(),
        raw: raw.to_string(),
    })?;

    let ordered = kind.supports_ordering_operators();
    let compare = |op| Predicate::compare(field.clone(), kind.clone(), op, value.clone());
    Ok(match filter.operator {
        FilterOperator::NotEqual => compare(CompareOp::Eq).not(),
        FilterOperator::GreaterThan if ordered => compare(CompareOp::Gt),
        FilterOperator::LessThan if ordered => compare(CompareOp::Lt),
        _ => compare(CompareOp::Eq),
    })
}

fn parse_value(kind: &FieldKind, raw: &str) -> Option<FieldValue> {
    match kind {
        FieldKind::Bool => parse_bool(raw).map(FieldValue::Bool),
        FieldKind::Int => raw.trim().parse::<i64>().ok().map(FieldValue::Int),
        FieldKind::Float => parse_float(raw).map(FieldValue::Float),
        FieldKind::Decimal => parse_decimal(raw).map(FieldValue::Decimal),
        FieldKind::Enum { .. } => kind
            .variant(raw)
            .map(|(_, name)| FieldValue::Enum(name.to_string())),
        FieldKind::Text | FieldKind::Date => None,
    }
}
