//! Shape registry: the explicitly registered schema table every planner works from.
//!
//! Shapes and enum types are registered once (in code through
//! [`ShapeRegistryBuilder`] or from a YAML catalogue) and are immutable
//! afterwards. All structural validation happens in [`ShapeRegistryBuilder::build`],
//! so lookups on a built registry only fail for names that were never registered.

use std::collections::{HashMap, HashSet};

use super::errors::ShapeCatalogError;
use super::scalar_types::is_valid_identifier;
use super::shape_schema::{EnumDescriptor, FieldDescriptor, FieldKind, ShapeDescriptor, ShapeId};

/// Source of shape metadata for the planner and the materializer.
///
/// Implementations must return identical descriptors on repeated calls:
/// compiled plans are cached on the assumption that shapes never change.
pub trait ShapeProvider: Send + Sync {
    fn shape(&self, id: &ShapeId) -> Result<&ShapeDescriptor, ShapeCatalogError>;

    fn enum_type(&self, name: &str) -> Result<&EnumDescriptor, ShapeCatalogError>;

    /// Ordered field descriptors of a shape
    fn fields(&self, id: &ShapeId) -> Result<&[FieldDescriptor], ShapeCatalogError> {
        Ok(&self.shape(id)?.fields)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    name: String,
    shapes: HashMap<ShapeId, ShapeDescriptor>,
    enums: HashMap<String, EnumDescriptor>,
    /// Registration order, for stable listings
    shape_order: Vec<ShapeId>,
}

impl ShapeRegistry {
    pub fn builder(name: impl Into<String>) -> ShapeRegistryBuilder {
        ShapeRegistryBuilder {
            name: name.into(),
            shapes: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains_shape(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// Registered shape ids in registration order
    pub fn shape_ids(&self) -> &[ShapeId] {
        &self.shape_order
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }
}

impl ShapeProvider for ShapeRegistry {
    fn shape(&self, id: &ShapeId) -> Result<&ShapeDescriptor, ShapeCatalogError> {
        self.shapes
            .get(id)
            .ok_or_else(|| ShapeCatalogError::UnknownShape {
                shape: id.to_string(),
            })
    }

    fn enum_type(&self, name: &str) -> Result<&EnumDescriptor, ShapeCatalogError> {
        self.enums
            .get(name)
            .ok_or_else(|| ShapeCatalogError::UnknownEnum {
                enum_name: name.to_string(),
            })
    }
}

/// Collects shape and enum declarations; `build` validates them as a whole so
/// shapes may reference each other (including cyclically) in any order.
#[derive(Debug, Clone)]
pub struct ShapeRegistryBuilder {
    name: String,
    shapes: Vec<ShapeDescriptor>,
    enums: Vec<EnumDescriptor>,
}

impl ShapeRegistryBuilder {
    pub fn shape(mut self, shape: ShapeDescriptor) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn enum_type(mut self, enum_type: EnumDescriptor) -> Self {
        self.enums.push(enum_type);
        self
    }

    pub fn build(self) -> Result<ShapeRegistry, ShapeCatalogError> {
        let mut enums = HashMap::new();
        for enum_type in self.enums {
            check_identifier(&enum_type.name)?;
            let mut seen = HashSet::new();
            for member in &enum_type.members {
                check_identifier(&member.name)?;
                if !seen.insert(member.name.as_str()) {
                    return Err(ShapeCatalogError::DuplicateEnumMember {
                        enum_name: enum_type.name.clone(),
                        member: member.name.clone(),
                    });
                }
            }
            if enums.contains_key(&enum_type.name) {
                return Err(ShapeCatalogError::DuplicateEnum {
                    enum_name: enum_type.name,
                });
            }
            enums.insert(enum_type.name.clone(), enum_type);
        }

        let mut shapes = HashMap::new();
        let mut shape_order = Vec::new();
        for shape in self.shapes {
            check_identifier(shape.id.as_str())?;
            let mut seen = HashSet::new();
            for field in &shape.fields {
                check_identifier(&field.name)?;
                if !seen.insert(field.name.as_str()) {
                    return Err(ShapeCatalogError::DuplicateField {
                        shape: shape.id.to_string(),
                        field: field.name.clone(),
                    });
                }
                if let Some(mapping) = &field.mapping {
                    check_identifier(&mapping.source_field)?;
                    if let Some(sub) = &mapping.source_subfield {
                        check_identifier(sub)?;
                    }
                }
            }
            if shapes.contains_key(&shape.id) {
                return Err(ShapeCatalogError::DuplicateShape {
                    shape: shape.id.to_string(),
                });
            }
            shape_order.push(shape.id.clone());
            shapes.insert(shape.id.clone(), shape);
        }

        // Every reference must resolve once everything is registered
        for id in &shape_order {
            let shape = &shapes[id];
            for field in &shape.fields {
                let dangling = match &field.kind {
                    FieldKind::Scalar(_) => None,
                    FieldKind::Enum(name) => {
                        (!enums.contains_key(name)).then(|| format!("enum `{}`", name))
                    }
                    FieldKind::Nested(target) | FieldKind::Collection(target) => {
                        (!shapes.contains_key(target)).then(|| format!("shape `{}`", target))
                    }
                };
                if let Some(reference) = dangling {
                    return Err(ShapeCatalogError::DanglingReference {
                        shape: id.to_string(),
                        field: field.name.clone(),
                        reference,
                    });
                }
            }
        }

        log::debug!(
            "Registered shape catalogue '{}': {} shapes, {} enums",
            self.name,
            shapes.len(),
            enums.len()
        );

        Ok(ShapeRegistry {
            name: self.name,
            shapes,
            enums,
            shape_order,
        })
    }
}

fn check_identifier(name: &str) -> Result<(), ShapeCatalogError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(ShapeCatalogError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
