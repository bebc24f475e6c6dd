//! Output shaping
//!
//! Projects a record into a JSON object holding the requested fields under
//! their declared names. With no requested fields, every declared field is
//! emitted in declaration order.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::request::Field;
use crate::shape::RecordShape;
use crate::value::Record;

/// Projection errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("Unknown field '{field}' on shape '{shape}'")]
    UnknownField { shape: String, field: String },
}

/// Projects `record` onto the requested `fields` of `model`.
///
/// Missing record values are emitted as null.
pub fn project<R: Record + ?Sized>(
    model: &RecordShape,
    record: &R,
    fields: &[Field],
) -> Result<Map<String, Value>, ProjectionError> {
    project_names(model, record, fields.iter().map(|f| f.member.as_str()))
}

/// Like `project`, from the raw comma-separated `fields` text.
pub fn project_raw<R: Record + ?Sized>(
    model: &RecordShape,
    record: &R,
    raw: Option<&str>,
) -> Result<Map<String, Value>, ProjectionError> {
    let names = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty());
    project_names(model, record, names)
}

fn project_names<'a, R, I>(
    model: &RecordShape,
    record: &R,
    names: I,
) -> Result<Map<String, Value>, ProjectionError>
where
    R: Record + ?Sized,
    I: Iterator<Item = &'a str>,
{
    let mut selected = Vec::new();
    for name in names {
        let def = model.field(name).ok_or_else(|| ProjectionError::UnknownField {
            shape: model.name().to_string(),
            field: name.trim().to_string(),
        })?;
        selected.push(def);
    }
    if selected.is_empty() {
        selected = model.fields().iter().collect();
    }

    let mut out = Map::with_capacity(selected.len());
    for def in selected {
        let value = record
            .value(&def.name)
            .map(|v| v.coerce(&def.kind).unwrap_or(v))
            .map_or(Value::Null, |v| v.to_json());
        out.insert(def.name.clone(), value);
    }
    Ok(out)
}
