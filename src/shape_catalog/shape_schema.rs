use serde::{Deserialize, Serialize};
use std::fmt;

use super::scalar_types::ScalarType;

/// Identity of a registered shape (its registered name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub String);

impl ShapeId {
    pub fn new(name: impl Into<String>) -> Self {
        ShapeId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(s: &str) -> Self {
        ShapeId(s.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(s: String) -> Self {
        ShapeId(s)
    }
}

/// What a field holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Scalar(ScalarType),
    /// Enum type name
    Enum(String),
    /// Nested object of the given shape
    Nested(ShapeId),
    /// Ordered collection whose elements have the given shape
    Collection(ShapeId),
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            FieldKind::Scalar(t) => format!("scalar {}", t),
            FieldKind::Enum(e) => format!("enum {}", e),
            FieldKind::Nested(s) => format!("shape {}", s),
            FieldKind::Collection(s) => format!("collection of {}", s),
        }
    }
}

/// Explicit-mapping override declared on a target field.
///
/// `source_subfield` absent means either a one-hop rename (scalar source field)
/// or `source_field.<target field name>` when the source field is a nested shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverride {
    pub source_field: String,
    pub source_subfield: Option<String>,
}

impl FieldOverride {
    pub fn field(source_field: impl Into<String>) -> Self {
        FieldOverride {
            source_field: source_field.into(),
            source_subfield: None,
        }
    }

    pub fn path(source_field: impl Into<String>, source_subfield: impl Into<String>) -> Self {
        FieldOverride {
            source_field: source_field.into(),
            source_subfield: Some(source_subfield.into()),
        }
    }
}

impl fmt::Display for FieldOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_subfield {
            Some(sub) => write!(f, "{}.{}", self.source_field, sub),
            None => write!(f, "{}", self.source_field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    pub mapping: Option<FieldOverride>,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::with_kind(name, FieldKind::Scalar(scalar))
    }

    pub fn enumeration(name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Enum(enum_name.into()))
    }

    pub fn nested(name: impl Into<String>, shape: impl Into<ShapeId>) -> Self {
        Self::with_kind(name, FieldKind::Nested(shape.into()))
    }

    pub fn collection(name: impl Into<String>, element: impl Into<ShapeId>) -> Self {
        Self::with_kind(name, FieldKind::Collection(element.into()))
    }

    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldDescriptor {
            name: name.into(),
            kind,
            nullable: false,
            mapping: None,
        }
    }

    /// Mark the field as nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach an explicit-mapping override
    pub fn mapped_from(mut self, mapping: FieldOverride) -> Self {
        self.mapping = Some(mapping);
        self
    }
}

/// A named, ordered set of typed fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub id: ShapeId,
    pub fields: Vec<FieldDescriptor>,
}

impl ShapeDescriptor {
    pub fn new(id: impl Into<ShapeId>, fields: Vec<FieldDescriptor>) -> Self {
        ShapeDescriptor {
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// Enum type: named members over an integer representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, members: &[(&str, i64)]) -> Self {
        EnumDescriptor {
            name: name.into(),
            members: members
                .iter()
                .map(|(n, v)| EnumMember {
                    name: n.to_string(),
                    value: *v,
                })
                .collect(),
        }
    }

    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.members.iter().find(|m| m.name == member).map(|m| m.value)
    }

    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.value == value)
            .map(|m| m.name.as_str())
    }
}
