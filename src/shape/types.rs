//! Record shape definitions
//!
//! A shape is an explicit field table registered once per record type.
//! Supported field kinds:
//! - text: UTF-8 string
//! - bool: Boolean
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - decimal: fixed-point decimal
//! - date: calendar date / date-time
//! - enum: closed set of named variants

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::{ShapeError, ShapeResult};

/// Declared type category of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// UTF-8 string
    Text,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Fixed-point decimal
    Decimal,
    /// Calendar date or date-time
    Date,
    /// Enumeration with ordered, named variants
    Enum {
        /// Variant names in declaration order
        variants: Vec<String>,
    },
}

impl FieldKind {
    /// Returns the type name for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Decimal => "decimal",
            FieldKind::Date => "date",
            FieldKind::Enum { .. } => "enum",
        }
    }

    /// Boolean and enumeration fields only support (in)equality.
    pub fn supports_ordering_operators(&self) -> bool {
        !matches!(self, FieldKind::Bool | FieldKind::Enum { .. })
    }

    /// Finds the canonical variant name and its position, ignoring ASCII case.
    pub fn variant(&self, name: &str) -> Option<(usize, &str)> {
        match self {
            FieldKind::Enum { variants } => variants
                .iter()
                .enumerate()
                .find(|(_, v)| v.eq_ignore_ascii_case(name.trim()))
                .map(|(i, v)| (i, v.as_str())),
            _ => None,
        }
    }
}

/// Explicit mapping from a logical field to its storage counterpart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    /// Name of the field at the remote source (defaults to the declared name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Field only exists after projection and has no remote counterpart
    #[serde(default)]
    pub computed_only: bool,
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared (logical) field name
    pub name: String,
    /// Field data type
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Backing-field mapping, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<FieldMap>,
}

impl FieldDef {
    /// Create an unmapped field
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            map: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Decimal)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldKind::Enum {
                variants: variants.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Maps the field onto a differently named remote field
    pub fn backed_by(mut self, field: impl Into<String>) -> Self {
        self.map.get_or_insert_with(FieldMap::default).field = Some(field.into());
        self
    }

    /// Marks the field as computed-only (no remote counterpart)
    pub fn computed_only(mut self) -> Self {
        self.map.get_or_insert_with(FieldMap::default).computed_only = true;
        self
    }

    /// Name used to address this field at the remote source
    pub fn backing_name(&self) -> &str {
        self.map
            .as_ref()
            .and_then(|m| m.field.as_deref())
            .unwrap_or(&self.name)
    }

    /// Returns true if the field has no remote counterpart
    pub fn is_computed_only(&self) -> bool {
        self.map.as_ref().map_or(false, |m| m.computed_only)
    }
}

/// Resolution result for a member name against a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldClass<'a> {
    /// Declared name, in its declared case
    pub name: &'a str,
    /// Declared type category
    pub kind: &'a FieldKind,
    /// Remote name of the field
    pub backing_name: &'a str,
    /// Field exists only on the post-projection shape
    pub computed_only: bool,
}

/// Serialized form of a shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

/// A record shape: an ordered field table with case-insensitive lookup.
///
/// Shapes are immutable once built and can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShapeDef", into = "ShapeDef")]
pub struct RecordShape {
    name: String,
    description: Option<String>,
    fields: Vec<FieldDef>,
    /// Lowercased name -> position in `fields`
    index: HashMap<String, usize>,
}

impl RecordShape {
    /// Start building a shape
    pub fn builder(name: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    /// Build a shape from field definitions.
    ///
    /// Fails on duplicate names (ignoring case) or enumerations without variants.
    pub fn try_new(name: impl Into<String>, fields: Vec<FieldDef>) -> ShapeResult<Self> {
        let name = name.into();
        let mut index = HashMap::with_capacity(fields.len());

        for (pos, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(ShapeError::EmptyFieldName { shape: name });
            }
            if let FieldKind::Enum { variants } = &field.kind {
                if variants.is_empty() {
                    return Err(ShapeError::EmptyEnum {
                        shape: name,
                        field: field.name.clone(),
                    });
                }
            }
            if index.insert(field.name.to_ascii_lowercase(), pos).is_some() {
                return Err(ShapeError::DuplicateField {
                    shape: name,
                    field: field.name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            description: None,
            fields,
            index,
        })
    }

    /// Parse a shape from its JSON definition
    pub fn from_json_str(json: &str) -> ShapeResult<Self> {
        serde_json::from_str(json).map_err(|e| ShapeError::Malformed(e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field definition, ignoring ASCII case
    pub fn field(&self, member: &str) -> Option<&FieldDef> {
        self.index
            .get(&member.trim().to_ascii_lowercase())
            .map(|&pos| &self.fields[pos])
    }

    /// Returns true if the member resolves on this shape
    pub fn contains(&self, member: &str) -> bool {
        self.field(member).is_some()
    }

    /// Classifies a member name: declared type, backing name, computed flag.
    ///
    /// Pure lookup; returns None when the member is not declared.
    pub fn resolve(&self, member: &str) -> Option<FieldClass<'_>> {
        self.field(member).map(|def| FieldClass {
            name: &def.name,
            kind: &def.kind,
            backing_name: def.backing_name(),
            computed_only: def.is_computed_only(),
        })
    }

    /// Derives the remote entity shape: every stored field under its backing name.
    pub fn backing_shape(&self) -> ShapeResult<RecordShape> {
        let fields = self
            .fields
            .iter()
            .filter(|f| !f.is_computed_only())
            .map(|f| FieldDef::new(f.backing_name(), f.kind.clone()))
            .collect();
        RecordShape::try_new(self.name.clone(), fields)
    }
}

impl TryFrom<ShapeDef> for RecordShape {
    type Error = ShapeError;

    fn try_from(def: ShapeDef) -> ShapeResult<Self> {
        let mut shape = RecordShape::try_new(def.name, def.fields)?;
        shape.description = def.description;
        Ok(shape)
    }
}

impl From<RecordShape> for ShapeDef {
    fn from(shape: RecordShape) -> Self {
        ShapeDef {
            name: shape.name,
            description: shape.description,
            fields: shape.fields,
        }
    }
}

/// Incremental shape construction
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<FieldDef>,
}

impl ShapeBuilder {
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> ShapeResult<RecordShape> {
        let mut shape = RecordShape::try_new(self.name, self.fields)?;
        shape.description = self.description;
        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> RecordShape {
        RecordShape::builder("accounts")
            .field(FieldDef::text("Name"))
            .field(FieldDef::text("DisplayName").backed_by("display_name"))
            .field(FieldDef::float("Score").computed_only())
            .field(FieldDef::enumeration("Status", ["Active", "Pending", "Closed"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let shape = accounts();
        let class = shape.resolve("nAmE").unwrap();
        assert_eq!(class.name, "Name");
        assert_eq!(class.backing_name, "Name");
        assert!(!class.computed_only);
    }

    #[test]
    fn test_resolve_backing_mapping() {
        let shape = accounts();
        let class = shape.resolve("displayname").unwrap();
        assert_eq!(class.backing_name, "display_name");
        assert_eq!(class.kind, &FieldKind::Text);
    }

    #[test]
    fn test_resolve_computed_only() {
        let shape = accounts();
        let class = shape.resolve("score").unwrap();
        assert!(class.computed_only);
        assert_eq!(class.backing_name, "Score");
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(accounts().resolve("missing").is_none());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = RecordShape::builder("dup")
            .field(FieldDef::text("name"))
            .field(FieldDef::int("NAME"))
            .build();
        assert!(matches!(result, Err(ShapeError::DuplicateField { .. })));
    }

    #[test]
    fn test_enum_without_variants_rejected() {
        let result = RecordShape::try_new(
            "bad",
            vec![FieldDef::enumeration("status", Vec::<String>::new())],
        );
        assert!(matches!(result, Err(ShapeError::EmptyEnum { .. })));
    }

    #[test]
    fn test_variant_lookup() {
        let shape = accounts();
        let kind = shape.resolve("status").unwrap().kind;
        assert_eq!(kind.variant("pending"), Some((1, "Pending")));
        assert_eq!(kind.variant("Archived"), None);
        assert!(!kind.supports_ordering_operators());
    }

    #[test]
    fn test_backing_shape_drops_computed_fields() {
        let entity = accounts().backing_shape().unwrap();
        assert!(entity.contains("display_name"));
        assert!(entity.contains("name"));
        assert!(!entity.contains("score"));
        assert!(!entity.contains("DisplayName"));
    }

    #[test]
    fn test_json_definition() {
        let shape = RecordShape::from_json_str(
            r#"{
                "name": "orders",
                "fields": [
                    {"name": "id", "type": "int"},
                    {"name": "placedOn", "type": "date", "map": {"field": "placed_on"}},
                    {"name": "total", "type": "decimal"},
                    {"name": "state", "type": "enum", "variants": ["Open", "Shipped"]},
                    {"name": "label", "type": "text", "map": {"computed_only": true}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(shape.name(), "orders");
        assert_eq!(shape.fields().len(), 5);
        assert_eq!(shape.resolve("PLACEDON").unwrap().backing_name, "placed_on");
        assert!(shape.resolve("label").unwrap().computed_only);
        assert_eq!(shape.resolve("total").unwrap().kind.type_name(), "decimal");
    }

    #[test]
    fn test_json_definition_duplicate_rejected() {
        let result = RecordShape::from_json_str(
            r#"{"name": "x", "fields": [{"name": "a", "type": "int"}, {"name": "A", "type": "text"}]}"#,
        );
        assert!(matches!(result, Err(ShapeError::Malformed(_))));
    }
}
