//! Predicate construction
//!
//! `PredicateBuilder` turns one `Filter` into a typed `Predicate` for a given
//! evaluation stage. The resulting IR is storage-neutral: `source::SqlQuery`
//! compiles it, `Predicate::evaluate` runs it over in-memory records.

mod ast;
mod builder;
mod target;

pub use ast::{CompareOp, Predicate};
pub use builder::{Outcome, PredicateBuilder};
pub use target::{Neutral, Target};
