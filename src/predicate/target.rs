//! Evaluation stage selection
//!
//! A request runs in two stages. The remote stage sees the entity shape and
//! must skip computed-only fields; the in-memory stage sees the model shape and
//! handles only computed-only fields. Each field is therefore applied exactly
//! once.

use std::fmt;

use crate::shape::{FieldClass, RecordShape};

/// Where a predicate or ordering will be evaluated
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Pushdown to the remote source, addressed through the entity shape
    Remote(&'a RecordShape),
    /// In-memory evaluation over model records
    Model,
}

impl<'a> Target<'a> {
    pub fn is_remote(&self) -> bool {
        matches!(self, Target::Remote(_))
    }

    /// Name used to address `class` at this stage.
    pub fn address(&self, class: &FieldClass<'_>) -> Result<String, Neutral> {
        match self {
            Target::Remote(_) if class.computed_only => Err(Neutral::OtherStage),
            Target::Remote(entity) => entity
                .resolve(class.backing_name)
                .map(|backing| backing.name.to_string())
                .ok_or_else(|| Neutral::MissingBacking(class.backing_name.to_string())),
            Target::Model if !class.computed_only => Err(Neutral::OtherStage),
            Target::Model => Ok(class.name.to_string()),
        }
    }
}

/// Why a filter or sort contributes nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Neutral {
    /// Member does not resolve on the model shape
    UnknownMember,
    /// Field is applied at the other stage
    OtherStage,
    /// Entity shape has no field under this backing name
    MissingBacking(String),
    /// Blank or absent text value
    BlankText,
    /// Absent value for a non-text field
    MissingValue,
    /// Value does not parse as the field's kind
    Unparseable { kind: &'static str, raw: String },
}

impl Neutral {
    /// Stage skips and blank text are expected; everything else is a degradation.
    pub fn is_expected(&self) -> bool {
        matches!(self, Neutral::OtherStage | Neutral::BlankText)
    }
}

impl fmt::Display for Neutral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Neutral::UnknownMember => write!(f, "unknown member"),
            Neutral::OtherStage => write!(f, "applied at the other stage"),
            Neutral::MissingBacking(name) => write!(f, "entity has no field '{}'", name),
            Neutral::BlankText => write!(f, "blank text value"),
            Neutral::MissingValue => write!(f, "missing value"),
            Neutral::Unparseable { kind, raw } => write!(f, "'{}' is not a valid {}", raw, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FieldDef;

    fn model() -> RecordShape {
        RecordShape::builder("accounts")
            .field(FieldDef::text("DisplayName").backed_by("display_name"))
            .field(FieldDef::float("Score").computed_only())
            .field(FieldDef::text("Legacy").backed_by("legacy_col"))
            .build()
            .unwrap()
    }

    fn entity() -> RecordShape {
        RecordShape::builder("account_rows")
            .field(FieldDef::text("Display_Name"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_remote_addresses_entity_field() {
        let model = model();
        let entity = entity();
        let class = model.resolve("displayname").unwrap();
        assert_eq!(
            Target::Remote(&entity).address(&class),
            Ok("Display_Name".to_string())
        );
    }

    #[test]
    fn test_remote_skips_computed_and_missing() {
        let model = model();
        let entity = entity();
        let remote = Target::Remote(&entity);

        let score = model.resolve("score").unwrap();
        assert_eq!(remote.address(&score), Err(Neutral::OtherStage));

        let legacy = model.resolve("legacy").unwrap();
        assert_eq!(
            remote.address(&legacy),
            Err(Neutral::MissingBacking("legacy_col".into()))
        );
    }

    #[test]
    fn test_model_handles_only_computed() {
        let model = model();
        let score = model.resolve("SCORE").unwrap();
        assert_eq!(Target::Model.address(&score), Ok("Score".to_string()));

        let display = model.resolve("displayname").unwrap();
        assert_eq!(Target::Model.address(&display), Err(Neutral::OtherStage));
    }
}
