//! Tagged field values
//!
//! One variant per supported kind. Values read from records are coerced to the
//! kind of the field being compared before any comparison happens.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shape::FieldKind;

/// Date-time layouts accepted when coercing text into a date value
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// A typed field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Date(NaiveDateTime),
    /// Canonical variant name
    Enum(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Converts this value into the representation used by `kind`.
    ///
    /// Returns None when the value has no sensible reading as that kind.
    /// Null stays null for every kind.
    pub fn coerce(&self, kind: &FieldKind) -> Option<FieldValue> {
        use FieldValue as V;

        if self.is_null() {
            return Some(V::Null);
        }

        match (kind, self) {
            (FieldKind::Text, V::Text(s)) | (FieldKind::Text, V::Enum(s)) => {
                Some(V::Text(s.clone()))
            }

            (FieldKind::Bool, V::Bool(b)) => Some(V::Bool(*b)),
            (FieldKind::Bool, V::Text(s)) => parse_bool(s).map(V::Bool),

            (FieldKind::Int, V::Int(i)) => Some(V::Int(*i)),
            // `i64::MAX as f64` is 2^63, one past the largest i64.
            (FieldKind::Int, V::Float(f))
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(V::Int(*f as i64))
            }
            (FieldKind::Int, V::Decimal(d)) if d.fract().is_zero() => d.to_i64().map(V::Int),
            (FieldKind::Int, V::Text(s)) => s.trim().parse().ok().map(V::Int),

            (FieldKind::Float, V::Float(f)) => Some(V::Float(*f)),
            (FieldKind::Float, V::Int(i)) => Some(V::Float(*i as f64)),
            (FieldKind::Float, V::Decimal(d)) => d.to_f64().map(V::Float),
            (FieldKind::Float, V::Text(s)) => parse_float(s).map(V::Float),

            (FieldKind::Decimal, V::Decimal(d)) => Some(V::Decimal(*d)),
            (FieldKind::Decimal, V::Int(i)) => Some(V::Decimal(Decimal::from(*i))),
            (FieldKind::Decimal, V::Float(f)) => Decimal::try_from(*f).ok().map(V::Decimal),
            (FieldKind::Decimal, V::Text(s)) => parse_decimal(s).map(V::Decimal),

            (FieldKind::Date, V::Date(d)) => Some(V::Date(*d)),
            (FieldKind::Date, V::Text(s)) => parse_date_time(s).map(V::Date),

            (FieldKind::Enum { .. }, V::Enum(s)) | (FieldKind::Enum { .. }, V::Text(s)) => kind
                .variant(s)
                .map(|(_, name)| V::Enum(name.to_string())),
            (FieldKind::Enum { variants }, V::Int(i)) => usize::try_from(*i)
                .ok()
                .and_then(|pos| variants.get(pos))
                .map(|name| V::Enum(name.clone())),

            _ => None,
        }
    }

    /// Compares two values of the same category.
    ///
    /// Returns None for mismatched categories, nulls and NaN.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue as V;

        match (self, other) {
            (V::Text(a), V::Text(b)) => Some(a.cmp(b)),
            (V::Bool(a), V::Bool(b)) => Some(a.cmp(b)),
            (V::Int(a), V::Int(b)) => Some(a.cmp(b)),
            (V::Float(a), V::Float(b)) => a.partial_cmp(b),
            (V::Decimal(a), V::Decimal(b)) => Some(a.cmp(b)),
            (V::Date(a), V::Date(b)) => Some(a.cmp(b)),
            (V::Enum(a), V::Enum(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting values of one field.
    ///
    /// Null sorts first. Enumerations order by declaration position, floats by
    /// IEEE total order.
    pub fn sort_cmp(&self, other: &FieldValue, kind: &FieldKind) -> Ordering {
        use FieldValue as V;

        match (self, other) {
            (V::Null, V::Null) => Ordering::Equal,
            (V::Null, _) => Ordering::Less,
            (_, V::Null) => Ordering::Greater,
            (V::Float(a), V::Float(b)) => a.total_cmp(b),
            (V::Enum(a), V::Enum(b)) => {
                let pos = |name: &str| kind.variant(name).map(|(i, _)| i);
                pos(a).cmp(&pos(b)).then_with(|| a.cmp(b))
            }
            (a, b) => a
                .compare(b)
                .unwrap_or_else(|| a.category_rank().cmp(&b.category_rank())),
        }
    }

    fn category_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) => 2,
            FieldValue::Float(_) => 3,
            FieldValue::Decimal(_) => 4,
            FieldValue::Date(_) => 5,
            FieldValue::Enum(_) => 6,
            FieldValue::Text(_) => 7,
        }
    }

    /// Reads a JSON scalar; arrays and objects have no field value.
    pub fn from_json(value: &Value) -> Option<FieldValue> {
        match value {
            Value::Null => Some(FieldValue::Null),
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// JSON rendering used for projected output
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) | FieldValue::Enum(s) => Value::String(s.clone()),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Decimal(d) => Value::String(d.to_string()),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        FieldValue::Decimal(d)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(d: NaiveDateTime) -> Self {
        FieldValue::Date(d)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d.and_time(NaiveTime::MIN))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// `true` / `false`, ignoring ASCII case and surrounding whitespace
pub fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Finite 64-bit float
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Fixed-point decimal, plain or scientific notation
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// RFC 3339 (normalized to UTC), ISO-like date-times, or a bare date at midnight
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_kind() -> FieldKind {
        FieldKind::Enum {
            variants: vec!["Active".into(), "Pending".into(), "Closed".into()],
        }
    }

    #[test]
    fn test_coerce_text_to_date() {
        let v = FieldValue::from("2024-03-10T08:30:00");
        let d = v.coerce(&FieldKind::Date).unwrap();
        assert_eq!(
            d,
            FieldValue::Date(
                NaiveDate::from_ymd_opt(2024, 3, 10)
                    .unwrap()
                    .and_hms_opt(8, 30, 0)
                    .unwrap()
            )
        );

        let bare = FieldValue::from("2024-03-10").coerce(&FieldKind::Date).unwrap();
        assert_eq!(bare, FieldValue::from(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));

        assert!(FieldValue::from("yesterday").coerce(&FieldKind::Date).is_none());
    }

    #[test]
    fn test_coerce_rfc3339_normalizes_to_utc() {
        let d = FieldValue::from("2024-03-10T23:30:00-02:00")
            .coerce(&FieldKind::Date)
            .unwrap();
        assert_eq!(
            d,
            FieldValue::Date(
                NaiveDate::from_ymd_opt(2024, 3, 11)
                    .unwrap()
                    .and_hms_opt(1, 30, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(
            FieldValue::Int(3).coerce(&FieldKind::Float),
            Some(FieldValue::Float(3.0))
        );
        assert_eq!(
            FieldValue::Float(2.0).coerce(&FieldKind::Int),
            Some(FieldValue::Int(2))
        );
        assert_eq!(FieldValue::Float(2.5).coerce(&FieldKind::Int), None);
        assert_eq!(FieldValue::Float(1e20).coerce(&FieldKind::Int), None);
        assert_eq!(FieldValue::Float(-1e20).coerce(&FieldKind::Int), None);
        assert_eq!(
            FieldValue::Float(9_007_199_254_740_992.0).coerce(&FieldKind::Int),
            Some(FieldValue::Int(9_007_199_254_740_992))
        );
        assert_eq!(
            FieldValue::from("10.25").coerce(&FieldKind::Decimal),
            Some(FieldValue::Decimal(Decimal::new(1025, 2)))
        );
    }

    #[test]
    fn test_coerce_enum() {
        let kind = status_kind();
        assert_eq!(
            FieldValue::from("pending").coerce(&kind),
            Some(FieldValue::Enum("Pending".into()))
        );
        assert_eq!(
            FieldValue::Int(2).coerce(&kind),
            Some(FieldValue::Enum("Closed".into()))
        );
        assert_eq!(FieldValue::Int(7).coerce(&kind), None);
    }

    #[test]
    fn test_null_survives_coercion() {
        assert_eq!(FieldValue::Null.coerce(&FieldKind::Int), Some(FieldValue::Null));
    }

    #[test]
    fn test_compare_mismatched_categories() {
        assert_eq!(FieldValue::Int(1).compare(&FieldValue::from("1")), None);
        assert_eq!(
            FieldValue::from("apple").compare(&FieldValue::from("banana")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_sort_cmp_null_first_and_enum_position() {
        let kind = status_kind();
        let closed = FieldValue::Enum("Closed".into());
        let active = FieldValue::Enum("Active".into());
        assert_eq!(active.sort_cmp(&closed, &kind), Ordering::Less);
        assert_eq!(FieldValue::Null.sort_cmp(&active, &kind), Ordering::Less);
        assert_eq!(
            FieldValue::Float(f64::NAN).sort_cmp(&FieldValue::Float(1.0), &FieldKind::Float),
            Ordering::Greater
        );
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_decimal("1.5e2"), Some(Decimal::new(150, 0)));
        assert!(parse_decimal("abc").is_none());
    }

    #[test]
    fn test_to_json() {
        assert_eq!(FieldValue::Int(5).to_json(), serde_json::json!(5));
        assert_eq!(
            FieldValue::Decimal(Decimal::new(1999, 2)).to_json(),
            serde_json::json!("19.99")
        );
        assert_eq!(FieldValue::Float(f64::INFINITY).to_json(), Value::Null);
    }
}
