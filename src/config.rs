//! Filter manager configuration
//!
//! All settings have defaults; a config file only needs the keys it changes.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar-date layout expected in date filter values
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid date_format '{0}': it must round-trip a calendar date")]
    DateFormat(String),

    #[error("max_take must be > 0")]
    ZeroMaxTake,
}

/// Settings shared by the predicate/ordering builders and the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// `chrono` format a date filter value must match exactly.
    pub date_format: String,
    /// Upper bound applied to `take` wherever pagination is applied.
    pub max_take: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_take: None,
        }
    }
}

impl ManagerConfig {
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn with_max_take(mut self, max_take: usize) -> Self {
        self.max_take = Some(max_take);
        self
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: ManagerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that the date format can parse what it prints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_take == Some(0) {
            return Err(ConfigError::ZeroMaxTake);
        }

        let probe = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap_or_default();
        let mut rendered = String::new();
        if write!(rendered, "{}", probe.format(&self.date_format)).is_err() {
            return Err(ConfigError::DateFormat(self.date_format.clone()));
        }
        match NaiveDate::parse_from_str(&rendered, &self.date_format) {
            Ok(parsed) if parsed == probe => Ok(()),
            _ => Err(ConfigError::DateFormat(self.date_format.clone())),
        }
    }

    /// Applies the take ceiling
    pub fn clamp_take(&self, take: usize) -> usize {
        self.max_take.map_or(take, |max| take.min(max))
    }
}
