//! Recursive projection plan construction.
//!
//! Each matched field becomes one assignment, chosen by the kinds on both
//! sides:
//!
//! | target     | source              | assignment                              |
//! |------------|---------------------|-----------------------------------------|
//! | override   | scalar / enum match | DirectCopy / EnumConvert along the path |
//! | scalar T   | scalar T            | DirectCopy                              |
//! | enum       | enum / integer      | EnumConvert                             |
//! | collection | collection          | Collection (shallow levels only)        |
//! | shape      | shape               | Nested, or ConditionalNested if nullable|
//!
//! Anything else is skipped. Skips are logged at debug level and never fail the
//! build. Overrides only target scalar and enum fields; one that cannot be
//! resolved, or whose source field is not assignable, fails the build.
//!
//! ## Depth limits
//!
//! The top-level plan is built at depth 1 and every nested object adds one.
//! - Collections are only expanded at depth <= `collection_depth`. Element
//!   plans start at `collection_element_depth` (never shallower than the
//!   collection's own depth + 1).
//! - Nested objects past `max_nested_depth` are omitted unless the caller asked
//!   to load children.
//! - Nothing is ever built past `hard_depth_limit`, which is what guarantees
//!   termination on self-referential shapes when children are loaded.

use crate::shape_catalog::registry::ShapeProvider;
use crate::shape_catalog::shape_schema::{FieldKind, ShapeId};

use super::errors::PlanBuildError;
use super::field_matcher::{FieldMapping, FieldMatcher};
use super::plan::{AssignmentKind, FieldAssignment, MappingOrigin, ProjectionPlan, SourcePath};
use super::{PlanLimits, ProjectionOptions};

pub struct PlanBuilder<'a> {
    provider: &'a dyn ShapeProvider,
    matcher: &'a FieldMatcher,
    limits: PlanLimits,
    options: ProjectionOptions,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(
        provider: &'a dyn ShapeProvider,
        matcher: &'a FieldMatcher,
        limits: PlanLimits,
        options: ProjectionOptions,
    ) -> Self {
        PlanBuilder {
            provider,
            matcher,
            limits,
            options,
        }
    }

    /// Build the top-level plan for a shape pair
    pub fn build(&self, source: &ShapeId, target: &ShapeId) -> Result<ProjectionPlan, PlanBuildError> {
        self.build_at(source, target, 1)
    }

    fn build_at(
        &self,
        source: &ShapeId,
        target: &ShapeId,
        depth: u32,
    ) -> Result<ProjectionPlan, PlanBuildError> {
        let mappings = self.matcher.match_fields(self.provider, source, target)?;

        let mut assignments = Vec::with_capacity(mappings.len());
        for mapping in mappings.iter() {
            let kind = match mapping.origin {
                MappingOrigin::ExplicitOverride => Some(override_assignment(target, mapping)?),
                MappingOrigin::Structural => self.assignment_for(mapping, depth)?,
            };
            if let Some(kind) = kind {
                assignments.push(FieldAssignment {
                    target_field: mapping.target.name.clone(),
                    origin: mapping.origin,
                    kind,
                });
            }
        }

        Ok(ProjectionPlan {
            source_shape: source.clone(),
            target_shape: target.clone(),
            depth,
            assignments,
        })
    }

    fn assignment_for(
        &self,
        mapping: &FieldMapping,
        depth: u32,
    ) -> Result<Option<AssignmentKind>, PlanBuildError> {

        let target = &mapping.target;
        let source = &mapping.source;
        let source_path = || SourcePath::field(&source.name, source.nullable);

        let kind = match (&target.kind, &source.kind) {
            (FieldKind::Scalar(t), FieldKind::Scalar(s)) if t == s => {
                Some(AssignmentKind::DirectCopy {
                    source: source_path(),
                })
            }

            (FieldKind::Enum(target_enum), FieldKind::Enum(source_enum)) => {
                Some(AssignmentKind::EnumConvert {
                    source: source_path(),
                    source_enum: Some(source_enum.clone()),
                    target_enum: target_enum.clone(),
                })
            }

            (FieldKind::Enum(target_enum), FieldKind::Scalar(s)) if s.is_integer() => {
                Some(AssignmentKind::EnumConvert {
                    source: source_path(),
                    source_enum: None,
                    target_enum: target_enum.clone(),
                })
            }

            (FieldKind::Collection(target_elem), FieldKind::Collection(source_elem)) => {
                self.collection_assignment(mapping, source_elem, target_elem, depth)?
            }

            (FieldKind::Nested(target_shape), FieldKind::Nested(source_shape)) => {
                self.nested_assignment(mapping, source_shape, target_shape, depth)?
            }

            (t, s) => {
                log::debug!(
                    "`{}`: {} cannot be projected from {}, skipped",
                    target.name,
                    t.describe(),
                    s.describe()
                );
                None
            }
        };

        Ok(kind)
    }

    fn collection_assignment(
        &self,
        mapping: &FieldMapping,
        source_elem: &ShapeId,
        target_elem: &ShapeId,
        depth: u32,
    ) -> Result<Option<AssignmentKind>, PlanBuildError> {
        if depth > self.limits.collection_depth {
            log::debug!(
                "`{}`: collection at depth {} not expanded (limit {})",
                mapping.target.name,
                depth,
                self.limits.collection_depth
            );
            return Ok(None);
        }

        let element_depth = self.limits.collection_element_depth.max(depth + 1);
        if element_depth > self.limits.hard_depth_limit {
            log::warn!(
                "`{}`: element plan depth {} exceeds hard limit {}, truncated",
                mapping.target.name,
                element_depth,
                self.limits.hard_depth_limit
            );
            return Ok(None);
        }

        let element_plan = self.build_at(source_elem, target_elem, element_depth)?;
        Ok(Some(AssignmentKind::Collection {
            source_field: mapping.source.name.clone(),
            element_plan,
        }))
    }

    fn nested_assignment(
        &self,
        mapping: &FieldMapping,
        source_shape: &ShapeId,
        target_shape: &ShapeId,
        depth: u32,
    ) -> Result<Option<AssignmentKind>, PlanBuildError> {
        if depth > self.limits.max_nested_depth && !self.options.load_children {
            log::debug!(
                "`{}`: nested object at depth {} omitted (children not loaded)",
                mapping.target.name,
                depth
            );
            return Ok(None);
        }

        if depth >= self.limits.hard_depth_limit {
            log::warn!(
                "`{}`: hard depth limit {} reached, nested object truncated",
                mapping.target.name,
                self.limits.hard_depth_limit
            );
            return Ok(None);
        }

        let plan = self.build_at(source_shape, target_shape, depth + 1)?;
        if plan.is_empty() {
            log::debug!(
                "`{}`: nested plan {} -> {} is empty, omitted",
                mapping.target.name,
                source_shape,
                target_shape
            );
            return Ok(None);
        }

        let source_field = mapping.source.name.clone();
        Ok(Some(if mapping.source.nullable {
            AssignmentKind::ConditionalNested { source_field, plan }
        } else {
            AssignmentKind::Nested { source_field, plan }
        }))
    }
}

/// Overrides skip the depth rules, but the field they point at must still be
/// assignable to the target field.
fn override_assignment(
    target_shape: &ShapeId,
    mapping: &FieldMapping,
) -> Result<AssignmentKind, PlanBuildError> {
    let source = mapping.source_path();
    match (&mapping.target.kind, &mapping.leaf().kind) {
        (FieldKind::Scalar(t), FieldKind::Scalar(s)) if t == s => {
            Ok(AssignmentKind::DirectCopy { source })
        }
        (FieldKind::Enum(target_enum), FieldKind::Enum(source_enum)) => {
            Ok(AssignmentKind::EnumConvert {
                source,
                source_enum: Some(source_enum.clone()),
                target_enum: target_enum.clone(),
            })
        }
        (FieldKind::Enum(target_enum), FieldKind::Scalar(s)) if s.is_integer() => {
            Ok(AssignmentKind::EnumConvert {
                source,
                source_enum: None,
                target_enum: target_enum.clone(),
            })
        }
        (t, s) => Err(PlanBuildError::IncompatibleOverride {
            target_shape: target_shape.to_string(),
            target_field: mapping.target.name.clone(),
            source_path: source.to_string(),
            expected: t.describe(),
            found: s.describe(),
        }),
    }
}
