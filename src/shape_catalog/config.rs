use super::errors::ShapeCatalogError;
use super::registry::ShapeRegistry;
use super::scalar_types::ScalarType;
use super::shape_schema::{
    EnumDescriptor, EnumMember, FieldDescriptor, FieldKind, FieldOverride, ShapeDescriptor,
    ShapeId,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Shape catalogues are declared in YAML with the following structure:
///
/// ```yaml
/// name: orders                  # Catalogue name
/// enums:
///   - name: ItemStatus
///     members:
///       - { name: Active, value: 0 }
///       - { name: Inactive, value: 1 }
/// shapes:
///   - name: ItemEntity          # Storage-side shape
///     fields:
///       - { name: Id, type: int }
///       - { name: Status, enum: ItemStatus }
///       - { name: Parent, shape: ParentEntity, nullable: true }
///       - { name: Tags, collection: TagEntity }
///   - name: ItemDto             # Presentation-side shape
///     fields:
///       - name: ParentTitle
///         type: string
///         mapping: { field: Parent, subfield: Title }
/// ```
///
/// Each field names exactly one of `type`, `enum`, `shape` or `collection`.
/// Field order in the file is the field order of the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeCatalogConfig {
    pub name: String,
    #[serde(default)]
    pub enums: Vec<EnumDefinition>,
    #[serde(default)]
    pub shapes: Vec<ShapeDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub members: Vec<EnumMemberDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMemberDefinition {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    /// Scalar type name (`int`, `Int64`, `string`, `guid`, ...)
    #[serde(default, rename = "type")]
    pub scalar_type: Option<String>,
    /// Enum type name
    #[serde(default, rename = "enum")]
    pub enum_type: Option<String>,
    /// Nested shape name
    #[serde(default)]
    pub shape: Option<String>,
    /// Element shape name of a collection
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub mapping: Option<MappingDefinition>,
}

/// Explicit-mapping override as written in a catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDefinition {
    pub field: String,
    #[serde(default)]
    pub subfield: Option<String>,
}

impl ShapeCatalogConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ShapeCatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| ShapeCatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ShapeCatalogError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ShapeCatalogError::ConfigReadError {
                error: format!("{}: {}", path.as_ref().display(), e),
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Convert the declarations into a validated registry
    pub fn to_registry(&self) -> Result<ShapeRegistry, ShapeCatalogError> {
        let mut builder = ShapeRegistry::builder(&self.name);

        for def in &self.enums {
            builder = builder.enum_type(EnumDescriptor {
                name: def.name.clone(),
                members: def
                    .members
                    .iter()
                    .map(|m| EnumMember {
                        name: m.name.clone(),
                        value: m.value,
                    })
                    .collect(),
            });
        }

        for def in &self.shapes {
            let fields = def
                .fields
                .iter()
                .map(|f| f.to_descriptor(&def.name))
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder.shape(ShapeDescriptor::new(def.name.as_str(), fields));
        }

        builder.build()
    }
}

impl FieldDefinition {
    fn to_descriptor(&self, shape: &str) -> Result<FieldDescriptor, ShapeCatalogError> {
        let mut kinds = Vec::new();
        if let Some(t) = &self.scalar_type {
            kinds.push(FieldKind::Scalar(t.parse::<ScalarType>()?));
        }
        if let Some(e) = &self.enum_type {
            kinds.push(FieldKind::Enum(e.clone()));
        }
        if let Some(s) = &self.shape {
            kinds.push(FieldKind::Nested(ShapeId::new(s.as_str())));
        }
        if let Some(c) = &self.collection {
            kinds.push(FieldKind::Collection(ShapeId::new(c.as_str())));
        }

        if kinds.len() != 1 {
            return Err(ShapeCatalogError::invalid_field(
                shape,
                &self.name,
                format!(
                    "expected exactly one of `type`, `enum`, `shape`, `collection` but found {}",
                    kinds.len()
                ),
            ));
        }

        Ok(FieldDescriptor {
            name: self.name.clone(),
            kind: kinds.remove(0),
            nullable: self.nullable,
            mapping: self.mapping.as_ref().map(|m| FieldOverride {
                source_field: m.field.clone(),
                source_subfield: m.subfield.clone(),
            }),
        })
    }
}
