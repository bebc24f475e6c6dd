//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::projection::ProjectionError;
use crate::request::ValidationError;
use crate::shape::ShapeError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Shape(#[from] ShapeError),

    #[error("{0}")]
    Usage(String),

    #[error("Request rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error("{0}")]
    Projection(#[from] ProjectionError),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        CliError::Usage(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        CliError::Io(msg.into())
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "APIFILTER_CONFIG_ERROR",
            CliError::Shape(_) => "APIFILTER_SHAPE_ERROR",
            CliError::Usage(_) => "APIFILTER_USAGE_ERROR",
            CliError::Rejected(_) => "APIFILTER_REQUEST_REJECTED",
            CliError::Projection(_) => "APIFILTER_PROJECTION_ERROR",
            CliError::Io(_) => "APIFILTER_IO_ERROR",
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
