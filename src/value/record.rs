//! Record access for in-memory evaluation
//!
//! Predicates and orderings read record fields by name through `Record`.
//! Implementations return None for fields they do not carry.

use serde_json::{Map, Value};

use super::field_value::FieldValue;

/// A materialized record whose fields can be read by name
pub trait Record {
    /// Returns the value stored under `field`, or None if absent.
    fn value(&self, field: &str) -> Option<FieldValue>;
}

impl<R: Record + ?Sized> Record for &R {
    fn value(&self, field: &str) -> Option<FieldValue> {
        (**self).value(field)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn value(&self, field: &str) -> Option<FieldValue> {
        (**self).value(field)
    }
}

/// JSON objects: exact key first, then a key equal ignoring ASCII case.
impl Record for Map<String, Value> {
    fn value(&self, field: &str) -> Option<FieldValue> {
        let raw = self.get(field).or_else(|| {
            self.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(field))
                .map(|(_, v)| v)
        })?;
        FieldValue::from_json(raw)
    }
}

impl Record for Value {
    fn value(&self, field: &str) -> Option<FieldValue> {
        self.as_object().and_then(|obj| obj.value(field))
    }
}
