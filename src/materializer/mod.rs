//! In-process plan walker.
//!
//! Applies a compiled [`ProjectionPlan`] to a source instance (a JSON object)
//! and produces the target instance. Target objects list the target shape's
//! fields in declaration order; fields without an assignment, or whose source
//! value is null, hold their type's default.
//!
//! Enum values are carried as their underlying integer. A source may also
//! give an enum as a member name, which is resolved against the source enum.

use serde_json::{Map, Value};

use crate::projection_planner::plan::{AssignmentKind, ProjectionPlan, SourcePath};
use crate::shape_catalog::registry::ShapeProvider;

pub mod defaults;
pub mod errors;

pub use defaults::default_value;
pub use errors::MaterializeError;

use defaults::json_type_name;

/// How enum values are written into target instances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnumOutput {
    /// Underlying integer value
    #[default]
    Value,
    /// Target enum member name with the same value (integer if there is none)
    MemberName,
}

pub struct Materializer<'a> {
    provider: &'a dyn ShapeProvider,
    enum_output: EnumOutput,
}

impl<'a> Materializer<'a> {
    pub fn new(provider: &'a dyn ShapeProvider) -> Self {
        Materializer {
            provider,
            enum_output: EnumOutput::Value,
        }
    }

    pub fn with_enum_output(mut self, enum_output: EnumOutput) -> Self {
        self.enum_output = enum_output;
        self
    }

    /// Build one target instance from one source instance
    pub fn materialize(
        &self,
        plan: &ProjectionPlan,
        source: &Value,
    ) -> Result<Value, MaterializeError> {
        let Value::Object(source_obj) = source else {
            return Err(MaterializeError::NotAnObject {
                shape: plan.source_shape.to_string(),
                found: json_type_name(source).to_string(),
            });
        };

        let target_fields = self.provider.fields(&plan.target_shape)?;
        let mut target = Map::with_capacity(target_fields.len());
        for field in target_fields {
            target.insert(field.name.clone(), default_value(field));
        }

        for assignment in &plan.assignments {
            let Some(target_field) = target_fields
                .iter()
                .find(|f| f.name == assignment.target_field)
            else {
                continue;
            };

            let value = match &assignment.kind {
                AssignmentKind::DirectCopy { source } => {
                    match read_path(source_obj, source, plan)? {
                        Some(v) => v.clone(),
                        None => default_value(target_field),
                    }
                }

                AssignmentKind::EnumConvert {
                    source,
                    source_enum,
                    target_enum,
                } => match read_path(source_obj, source, plan)? {
                    Some(v) => self.convert_enum(v, source_enum.as_deref(), target_enum, source)?,
                    None => default_value(target_field),
                },

                AssignmentKind::Nested {
                    source_field,
                    plan: child,
                } => match non_null(source_obj.get(source_field)) {
                    Some(v) => self.materialize(child, v)?,
                    None => {
                        return Err(MaterializeError::UnexpectedNull {
                            shape: plan.source_shape.to_string(),
                            field: source_field.clone(),
                        })
                    }
                },

                AssignmentKind::ConditionalNested {
                    source_field,
                    plan: child,
                } => match non_null(source_obj.get(source_field)) {
                    Some(v) => self.materialize(child, v)?,
                    None => Value::Null,
                },

                AssignmentKind::Collection {
                    source_field,
                    element_plan,
                } => match non_null(source_obj.get(source_field)) {
                    Some(Value::Array(items)) => Value::Array(
                        items
                            .iter()
                            .map(|item| self.materialize(element_plan, item))
                            .collect::<Result<Vec<_>, _>>()?,
                    ),
                    Some(other) => {
                        return Err(MaterializeError::NotAnArray {
                            field: source_field.clone(),
                            found: json_type_name(other).to_string(),
                        })
                    }
                    None => Value::Null,
                },
            };

            target.insert(assignment.target_field.clone(), value);
        }

        Ok(Value::Object(target))
    }

    /// Project every instance of a source sequence, preserving order and count
    pub fn project_all<'v, I>(
        &self,
        plan: &ProjectionPlan,
        sources: I,
    ) -> Result<Vec<Value>, MaterializeError>
    where
        I: IntoIterator<Item = &'v Value>,
    {
        sources
            .into_iter()
            .map(|source| self.materialize(plan, source))
            .collect()
    }

    fn convert_enum(
        &self,
        value: &Value,
        source_enum: Option<&str>,
        target_enum: &str,
        path: &SourcePath,
    ) -> Result<Value, MaterializeError> {
        let underlying = match (value, source_enum) {
            (Value::Number(n), _) => n.as_i64(),
            (Value::String(member), Some(enum_name)) => {
                let descriptor = self.provider.enum_type(enum_name)?;
                Some(descriptor.value_of(member).ok_or_else(|| {
                    MaterializeError::UnknownEnumMember {
                        enum_name: enum_name.to_string(),
                        member: member.clone(),
                    }
                })?)
            }
            _ => None,
        };

        let Some(underlying) = underlying else {
            return Err(MaterializeError::InvalidEnumValue {
                field: path.to_string(),
                found: value.to_string(),
            });
        };

        match self.enum_output {
            EnumOutput::Value => Ok(Value::from(underlying)),
            EnumOutput::MemberName => {
                let descriptor = self.provider.enum_type(target_enum)?;
                Ok(descriptor
                    .name_of(underlying)
                    .map(|name| Value::String(name.to_string()))
                    .unwrap_or_else(|| Value::from(underlying)))
            }
        }
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Follow a source path; `None` when any hop (or the leaf) is null or absent
fn read_path<'v>(
    source: &'v Map<String, Value>,
    path: &SourcePath,
    plan: &ProjectionPlan,
) -> Result<Option<&'v Value>, MaterializeError> {
    let mut current = source;
    let last = path.hops.len().saturating_sub(1);
    for (i, hop) in path.hops.iter().enumerate() {
        let Some(value) = non_null(current.get(&hop.field)) else {
            return Ok(None);
        };
        if i == last {
            return Ok(Some(value));
        }
        match value {
            Value::Object(obj) => current = obj,
            other => {
                return Err(MaterializeError::NotAnObject {
                    shape: format!("{}.{}", plan.source_shape, hop.field),
                    found: json_type_name(other).to_string(),
                })
            }
        }
    }
    Ok(None)
}

/// Convenience wrapper: one-shot materialization against a provider
pub fn materialize(
    provider: &dyn ShapeProvider,
    plan: &ProjectionPlan,
    source: &Value,
) -> Result<Value, MaterializeError> {
    Materializer::new(provider).materialize(plan, source)
}
