//! Record shapes and field resolution
//!
//! A shape is a statically registered field table. Resolution maps a
//! case-insensitive member name to its declared kind, its backing name at the
//! remote source and whether it is computed-only.

mod errors;
mod loader;
mod types;

pub use errors::{ShapeError, ShapeResult};
pub use loader::ShapeLoader;
pub use types::{FieldClass, FieldDef, FieldKind, FieldMap, RecordShape, ShapeBuilder, ShapeDef};
