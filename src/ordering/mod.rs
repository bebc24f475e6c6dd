//! Ordering construction and in-memory sorting
//!
//! Sort values are `FieldValue`s compared per category: nulls first,
//! enumerations by declaration position. Multi-key orderings are
//! lexicographic with the first key primary, and sorting is stable.

mod builder;
mod key;

pub use builder::OrderingBuilder;
pub use key::{compare_by, sort_records, OrderKey};
