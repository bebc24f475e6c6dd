//! Shape error types
//!
//! Raised while registering or loading shapes, never while filtering.

use thiserror::Error;

/// Result type for shape operations
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Shape registration and loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Two fields share a name (ignoring case)
    #[error("Duplicate field '{field}' in shape '{shape}'")]
    DuplicateField { shape: String, field: String },

    /// Enumeration declared without variants
    #[error("Enumeration field '{field}' in shape '{shape}' declares no variants")]
    EmptyEnum { shape: String, field: String },

    /// Field declared with a blank name
    #[error("Shape '{shape}' declares a field with an empty name")]
    EmptyFieldName { shape: String },

    /// Shape registered twice (ignoring case)
    #[error("Shape already registered: {0}")]
    DuplicateShape(String),

    /// Shape lookup failed
    #[error("Unknown shape: {0}")]
    UnknownShape(String),

    /// Definition could not be parsed
    #[error("Malformed shape definition: {0}")]
    Malformed(String),

    /// Definition file could not be read
    #[error("Failed to read shape file {path}: {reason}")]
    Io { path: String, reason: String },
}
