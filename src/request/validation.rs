//! Pre-flight request validation
//!
//! Validation is the strict gate in front of the planner: the planner itself
//! fails open and never re-checks. Checks run in a fixed order and the first
//! failing category wins: sorts, filters, fields, take, skip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::RequestDataSource;
use crate::shape::RecordShape;

/// Outcome of validating a request against a model shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestValidationStatus {
    InvalidFields,
    InvalidFilter,
    InvalidSort,
    InvalidSkip,
    InvalidTake,
    Valid,
}

impl RequestValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, RequestValidationStatus::Valid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestValidationStatus::InvalidFields => "invalid_fields",
            RequestValidationStatus::InvalidFilter => "invalid_filter",
            RequestValidationStatus::InvalidSort => "invalid_sort",
            RequestValidationStatus::InvalidSkip => "invalid_skip",
            RequestValidationStatus::InvalidTake => "invalid_take",
            RequestValidationStatus::Valid => "valid",
        }
    }

    /// HTTP status a serving boundary should answer with
    pub fn http_status(&self) -> u16 {
        if self.is_valid() {
            200
        } else {
            400
        }
    }
}

impl std::fmt::Display for RequestValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection detail for callers that propagate with `?`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown sort member '{member}'")]
    Sort { member: String },

    #[error("Invalid filter on '{member}': {reason}")]
    Filter { member: String, reason: String },

    #[error("Unknown output field '{member}'")]
    Fields { member: String },

    #[error("Invalid take '{raw}': expected a non-negative integer")]
    Take { raw: String },

    #[error("Invalid skip '{raw}': expected a non-negative integer")]
    Skip { raw: String },
}

impl ValidationError {
    pub fn status(&self) -> RequestValidationStatus {
        match self {
            ValidationError::Sort { .. } => RequestValidationStatus::InvalidSort,
            ValidationError::Filter { .. } => RequestValidationStatus::InvalidFilter,
            ValidationError::Fields { .. } => RequestValidationStatus::InvalidFields,
            ValidationError::Take { .. } => RequestValidationStatus::InvalidTake,
            ValidationError::Skip { .. } => RequestValidationStatus::InvalidSkip,
        }
    }
}

impl RequestDataSource {
    /// Checks every member, operator and paging marker against `model`.
    pub fn validate(&self, model: &RecordShape) -> RequestValidationStatus {
        match self.ensure_valid(model) {
            Ok(()) => RequestValidationStatus::Valid,
            Err(e) => e.status(),
        }
    }

    /// Like `validate`, naming the first offending member or value.
    pub fn ensure_valid(&self, model: &RecordShape) -> Result<(), ValidationError> {
        for sort in &self.sorts {
            if !model.contains(&sort.member) {
                return Err(ValidationError::Sort {
                    member: sort.member.clone(),
                });
            }
        }

        for filter in &self.filters {
            let Some(class) = model.resolve(&filter.member) else {
                return Err(ValidationError::Filter {
                    member: filter.member.clone(),
                    reason: "unknown member".to_string(),
                });
            };
            if filter.operator.is_ordering() && !class.kind.supports_ordering_operators() {
                return Err(ValidationError::Filter {
                    member: filter.member.clone(),
                    reason: format!(
                        "{} is not supported on {} fields",
                        filter.operator.as_str(),
                        class.kind.type_name()
                    ),
                });
            }
        }

        for field in &self.fields {
            if !field.is_valid(model) {
                return Err(ValidationError::Fields {
                    member: field.member.clone(),
                });
            }
        }

        check_count(self.take_raw.as_deref()).map_err(|raw| ValidationError::Take { raw })?;
        check_count(self.skip_raw.as_deref()).map_err(|raw| ValidationError::Skip { raw })?;

        Ok(())
    }
}

/// Absent or blank passes; anything else must be a non-negative integer.
fn check_count(raw: Option<&str>) -> Result<(), String> {
    match raw {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<usize>()
            .map(|_| ())
            .map_err(|_| s.to_string()),
        _ => Ok(()),
    }
}
