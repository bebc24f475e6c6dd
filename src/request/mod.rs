//! Request descriptors, query-string parsing and validation
//!
//! A `RequestDataSource` is built once per inbound request, validated against
//! the model shape, then handed to the `FilterManager`.

mod model;
mod parser;
mod validation;

pub use model::{Field, Filter, FilterOperator, RequestDataSource, Sort, SortDirection};
pub use parser::SEARCH_MEMBER;
pub use validation::{RequestValidationStatus, ValidationError};
