//! apifilter - typed filtering, sorting and paging for string-based API queries
//!
//! A query string is parsed into a `RequestDataSource`, validated against a
//! `RecordShape`, then planned by the `FilterManager` in two stages: a remote
//! stage composed onto any `QuerySource`, and an in-memory stage for
//! computed-only fields.

pub mod cli;
pub mod config;
pub mod manager;
pub mod ordering;
pub mod predicate;
pub mod projection;
pub mod request;
pub mod shape;
pub mod source;
pub mod value;

pub use config::{ConfigError, ManagerConfig};
pub use manager::FilterManager;
pub use ordering::{OrderKey, OrderingBuilder};
pub use predicate::{CompareOp, Predicate, PredicateBuilder, Target};
pub use projection::{project, project_raw, ProjectionError};
pub use request::{
    Field, Filter, FilterOperator, RequestDataSource, RequestValidationStatus, Sort,
    SortDirection, ValidationError,
};
pub use shape::{FieldDef, FieldKind, RecordShape, ShapeError, ShapeLoader};
pub use source::{LazyCollection, QuerySource, SqlQuery, SqlStatement};
pub use value::{FieldValue, Record};
