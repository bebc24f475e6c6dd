//! Typed values and record access

mod field_value;
mod record;

pub use field_value::{parse_bool, parse_date_time, parse_decimal, parse_float, FieldValue};
pub use record::Record;
