//! Query sources
//!
//! A `QuerySource` only composes: it records a where clause, an ordering and
//! paging steps, and something else executes them later. Two sources ship
//! with the crate:
//! - `LazyCollection`: deferred in-memory execution
//! - `SqlQuery`: compiles into a parameterised SELECT

mod lazy;
mod sql;

pub use lazy::{LazyCollection, Step};
pub use sql::{SqlParam, SqlQuery, SqlStatement};

use crate::ordering::OrderKey;
use crate::predicate::Predicate;

/// A lazily composed, pushdown-capable query
pub trait QuerySource: Sized {
    /// Restricts the source to records matching `predicate`
    fn filter(self, predicate: Predicate) -> Self;

    /// Orders by `keys`, first key primary
    fn order_by(self, keys: Vec<OrderKey>) -> Self;

    /// Skips the first `count` records
    fn skip(self, count: usize) -> Self;

    /// Keeps at most `count` records
    fn take(self, count: usize) -> Self;
}
