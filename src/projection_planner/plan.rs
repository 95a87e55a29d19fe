//! Projection plan AST.
//!
//! A plan is plain data: it names source fields and the target fields they
//! feed, nothing else. The in-process walker in `materializer` and the SQL
//! lowering in `sql_generator` both interpret the same tree, and the tree can
//! be serialized for any other backend.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shape_catalog::shape_schema::ShapeId;

/// One field hop in a source path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathHop {
    pub field: String,
    pub nullable: bool,
}

/// Path from the current source object to the value being copied.
/// Always one hop, or two for explicit overrides into a related object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePath {
    pub hops: Vec<PathHop>,
}

impl SourcePath {
    pub fn field(field: impl Into<String>, nullable: bool) -> Self {
        SourcePath {
            hops: vec![PathHop {
                field: field.into(),
                nullable,
            }],
        }
    }

    /// Append a hop into the value reached so far
    pub fn then(mut self, field: impl Into<String>, nullable: bool) -> Self {
        self.hops.push(PathHop {
            field: field.into(),
            nullable,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Whether an intermediate hop can be null, so reading the leaf needs a guard
    pub fn is_null_guarded(&self) -> bool {
        self.hops
            .iter()
            .take(self.hops.len().saturating_sub(1))
            .any(|h| h.nullable)
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.hops.iter().map(|h| h.field.as_str()).collect();
        write!(f, "{}", names.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingOrigin {
    /// Matched by identical field name
    Structural,
    /// Declared on the target field
    ExplicitOverride,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignmentKind {
    DirectCopy {
        source: SourcePath,
    },
    /// Value-preserving conversion of an enum's underlying integer.
    /// `source_enum` is `None` when the source is a plain integer field.
    EnumConvert {
        source: SourcePath,
        source_enum: Option<String>,
        target_enum: String,
    },
    Nested {
        source_field: String,
        plan: ProjectionPlan,
    },
    Collection {
        source_field: String,
        element_plan: ProjectionPlan,
    },
    /// Nested plan behind a null check on the source field
    ConditionalNested {
        source_field: String,
        plan: ProjectionPlan,
    },
}

impl AssignmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            AssignmentKind::DirectCopy { .. } => "DirectCopy",
            AssignmentKind::EnumConvert { .. } => "EnumConvert",
            AssignmentKind::Nested { .. } => "Nested",
            AssignmentKind::Collection { .. } => "Collection",
            AssignmentKind::ConditionalNested { .. } => "ConditionalNested",
        }
    }

    /// The child plan, if this assignment has one
    pub fn child_plan(&self) -> Option<&ProjectionPlan> {
        match self {
            AssignmentKind::Nested { plan, .. } | AssignmentKind::ConditionalNested { plan, .. } => {
                Some(plan)
            }
            AssignmentKind::Collection { element_plan, .. } => Some(element_plan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub target_field: String,
    pub origin: MappingOrigin,
    pub kind: AssignmentKind,
}

/// Ordered assignments turning a `source_shape` instance into a `target_shape` instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPlan {
    pub source_shape: ShapeId,
    pub target_shape: ShapeId,
    /// Recursion level this plan was built at (1 = top level)
    pub depth: u32,
    pub assignments: Vec<FieldAssignment>,
}

impl ProjectionPlan {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn assignment(&self, target_field: &str) -> Option<&FieldAssignment> {
        self.assignments
            .iter()
            .find(|a| a.target_field == target_field)
    }

    pub fn target_fields(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|a| a.target_field.as_str())
    }

    /// Number of assignments in this plan and every child plan
    pub fn node_count(&self) -> usize {
        self.assignments
            .iter()
            .map(|a| 1 + a.kind.child_plan().map_or(0, |p| p.node_count()))
            .sum()
    }

    /// Deepest recursion level reached by any child plan
    pub fn max_depth(&self) -> u32 {
        self.assignments
            .iter()
            .filter_map(|a| a.kind.child_plan())
            .map(|p| p.max_depth())
            .fold(self.depth, u32::max)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ProjectionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl ProjectionPlan {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        writeln!(f, "{}{} -> {}", pad, self.source_shape, self.target_shape)?;
        for a in &self.assignments {
            match &a.kind {
                AssignmentKind::DirectCopy { source } => {
                    writeln!(f, "{}  {} = {}", pad, a.target_field, source)?
                }
                AssignmentKind::EnumConvert {
                    source,
                    target_enum,
                    ..
                } => writeln!(f, "{}  {} = ({}) {}", pad, a.target_field, target_enum, source)?,
                AssignmentKind::Nested { source_field, plan }
                | AssignmentKind::ConditionalNested { source_field, plan } => {
                    let guard = if matches!(a.kind, AssignmentKind::ConditionalNested { .. }) {
                        "?"
                    } else {
                        ""
                    };
                    writeln!(f, "{}  {} = {}{}:", pad, a.target_field, source_field, guard)?;
                    plan.fmt_indented(f, indent + 2)?;
                }
                AssignmentKind::Collection {
                    source_field,
                    element_plan,
                } => {
                    writeln!(f, "{}  {} = {}[*]:", pad, a.target_field, source_field)?;
                    element_plan.fmt_indented(f, indent + 2)?;
                }
            }
        }
        Ok(())
    }
}
