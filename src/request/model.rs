//! Request descriptor types
//!
//! Built once per inbound request (usually by the query-string parser) and
//! read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::shape::RecordShape;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "equal",
            FilterOperator::NotEqual => "not_equal",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::LessThan => "less_than",
        }
    }

    /// GreaterThan / LessThan
    pub fn is_ordering(&self) -> bool {
        matches!(self, FilterOperator::GreaterThan | FilterOperator::LessThan)
    }
}

/// A single filter clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Field name, matched ignoring case
    pub member: String,
    pub operator: FilterOperator,
    /// Raw value text; None for an explicit `null`
    pub value: Option<String>,
}

impl Filter {
    pub fn new(member: impl Into<String>, operator: FilterOperator, value: Option<&str>) -> Self {
        Self {
            member: member.into(),
            operator,
            value: value.map(str::to_string),
        }
    }

    pub fn equal(member: impl Into<String>, value: &str) -> Self {
        Self::new(member, FilterOperator::Equal, Some(value))
    }

    pub fn not_equal(member: impl Into<String>, value: &str) -> Self {
        Self::new(member, FilterOperator::NotEqual, Some(value))
    }

    pub fn contains(member: impl Into<String>, value: &str) -> Self {
        Self::new(member, FilterOperator::Contains, Some(value))
    }

    pub fn not_contains(member: impl Into<String>, value: &str) -> Self {
        Self::new(member, FilterOperator::NotContains, Some(value))
    }

    pub fn greater_than(member: impl Into<String>, value: &str) -> Self {
        Self::new(member, FilterOperator::GreaterThan, Some(value))
    }

    pub fn less_than(member: impl Into<String>, value: &str) -> Self {
        Self::new(member, FilterOperator::LessThan, Some(value))
    }

    /// True when the member resolves to a computed-only field of `model`
    pub fn is_computed_only(&self, model: &RecordShape) -> bool {
        model
            .resolve(&self.member)
            .map_or(false, |class| class.computed_only)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// A single sort clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub member: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn is_computed_only(&self, model: &RecordShape) -> bool {
        model
            .resolve(&self.member)
            .map_or(false, |class| class.computed_only)
    }
}

/// Output-shaping field request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub member: String,
}

impl Field {
    pub fn new(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
        }
    }

    pub fn is_valid(&self, model: &RecordShape) -> bool {
        model.contains(&self.member)
    }
}

/// The parsed request: filters, sorts, output fields and raw paging markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDataSource {
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sorts: Vec<Sort>,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Raw `fields` text as received
    #[serde(default)]
    pub fields_raw: Option<String>,
    #[serde(default)]
    pub skip_raw: Option<String>,
    #[serde(default)]
    pub take_raw: Option<String>,
}

impl RequestDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_skip(mut self, raw: impl Into<String>) -> Self {
        self.skip_raw = Some(raw.into());
        self
    }

    pub fn with_take(mut self, raw: impl Into<String>) -> Self {
        self.take_raw = Some(raw.into());
        self
    }

    /// Parsed skip; None when absent or not a non-negative integer
    pub fn skip(&self) -> Option<usize> {
        parse_count(self.skip_raw.as_deref())
    }

    /// Parsed take; None when absent or not a non-negative integer
    pub fn take(&self) -> Option<usize> {
        parse_count(self.take_raw.as_deref())
    }

    /// No filters and no sorts
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sorts.is_empty()
    }

    /// True if any filter or sort targets a computed-only field of `model`.
    ///
    /// Decides where pagination runs: at the source when false, after
    /// in-memory evaluation when true.
    pub fn targets_computed(&self, model: &RecordShape) -> bool {
        self.sorts.iter().any(|s| s.is_computed_only(model))
            || self.filters.iter().any(|f| f.is_computed_only(model))
    }
}

pub(crate) fn parse_count(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}
