//! Projection pushdown: lowers a projection plan into a ClickHouse select list.
//!
//! The source shape is assumed to live in one table whose nested objects are
//! `Tuple` columns and whose collections are `Array(Tuple(...))` columns.
//!
//! - scalar and enum fields become one select item each
//! - nested objects are flattened into `Parent.Child` select items; a nullable
//!   parent guards every flattened item with `if(isNull(parent), NULL, ...)`
//! - collections become `arrayMap(x -> tuple(...), array)`, with element fields
//!   as positional tuple members in element-plan order

use serde::{Deserialize, Serialize};

use crate::projection_planner::plan::{AssignmentKind, ProjectionPlan, SourcePath};
use crate::shape_catalog::scalar_types::{is_valid_identifier, ScalarType};

mod errors;
pub mod render_expr;

pub use errors::SqlGenerationError;
pub use render_expr::{quote_identifier, RenderExpr};

pub trait ToSql {
    fn to_sql(&self) -> String;
}

/// Underlying type enum values are cast to when pushed down
const ENUM_VALUE_TYPE: ScalarType = ScalarType::Int64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    /// Table to select from; `None` renders only the select list
    pub table: Option<String>,
    pub table_alias: String,
}

impl Default for SqlOptions {
    fn default() -> Self {
        SqlOptions {
            table: None,
            table_alias: "src".to_string(),
        }
    }
}

impl SqlOptions {
    pub fn from_table(table: impl Into<String>) -> Self {
        SqlOptions {
            table: Some(table.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SelectItem {
    pub expression: RenderExpr,
    /// Dotted target path, e.g. `Parent.Title`
    pub col_alias: String,
}

impl ToSql for SelectItem {
    fn to_sql(&self) -> String {
        format!("{} AS {}", self.expression.to_sql(), quote_identifier(&self.col_alias))
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SelectFragment {
    pub items: Vec<SelectItem>,
    pub from: Option<String>,
    pub table_alias: String,
}

impl SelectFragment {
    /// Output column names in select order
    pub fn columns(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.col_alias.as_str()).collect()
    }

    /// Only the comma-separated select list
    pub fn select_list(&self) -> String {
        self.items
            .iter()
            .map(|i| i.to_sql())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ToSql for SelectFragment {
    fn to_sql(&self) -> String {
        match &self.from {
            Some(table) => format!(
                "SELECT {} FROM {} AS {}",
                self.select_list(),
                table,
                self.table_alias
            ),
            None => self.select_list(),
        }
    }
}

/// Lower a compiled plan into a select fragment
pub fn translate(
    plan: &ProjectionPlan,
    options: &SqlOptions,
) -> Result<SelectFragment, SqlGenerationError> {
    if !is_valid_identifier(&options.table_alias) {
        return Err(SqlGenerationError::InvalidTableAlias(
            options.table_alias.clone(),
        ));
    }
    if let Some(table) = &options.table {
        let parts: Vec<&str> = table.split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| is_valid_identifier(p)) {
            return Err(SqlGenerationError::InvalidTableName(table.clone()));
        }
    }
    if plan.is_empty() {
        return Err(SqlGenerationError::EmptyPlan {
            source_shape: plan.source_shape.to_string(),
            target_shape: plan.target_shape.to_string(),
        });
    }

    let mut items = Vec::new();
    flatten(plan, &Base::Table(options.table_alias.clone()), "", &[], &mut items);

    log::debug!(
        "Lowered projection {} -> {} into {} select items",
        plan.source_shape,
        plan.target_shape,
        items.len()
    );

    Ok(SelectFragment {
        items,
        from: options.table.clone(),
        table_alias: options.table_alias.clone(),
    })
}

/// What field accesses are relative to
enum Base {
    Table(String),
    Expr(RenderExpr),
}

impl Base {
    fn field(&self, name: &str) -> RenderExpr {
        match self {
            Base::Table(alias) => RenderExpr::Column {
                table_alias: alias.clone(),
                column: name.to_string(),
            },
            Base::Expr(expr) => expr.field(name),
        }
    }
}

fn flatten(
    plan: &ProjectionPlan,
    base: &Base,
    prefix: &str,
    guards: &[RenderExpr],
    out: &mut Vec<SelectItem>,
) {
    for assignment in &plan.assignments {
        let col_alias = format!("{}{}", prefix, assignment.target_field);
        match &assignment.kind {
            AssignmentKind::Nested { source_field, plan: child } => {
                let parent = base.field(source_field);
                flatten(child, &Base::Expr(parent), &format!("{}.", col_alias), guards, out);
            }
            AssignmentKind::ConditionalNested { source_field, plan: child } => {
                let parent = base.field(source_field);
                let mut child_guards = guards.to_vec();
                child_guards.push(parent.clone());
                flatten(child, &Base::Expr(parent), &format!("{}.", col_alias), &child_guards, out);
            }
            kind => {
                let expression = guards
                    .iter()
                    .rev()
                    .fold(value_expr(kind, base, !guards.is_empty()), |expr, guard| {
                        expr.null_guarded_by(guard)
                    });
                out.push(SelectItem {
                    expression,
                    col_alias,
                });
            }
        }
    }
}

/// Expression for one assignment relative to `base`.
///
/// `may_be_null` is set when `base` sits under a nullable parent; ClickHouse
/// evaluates both branches of `if`, so casts there must accept NULL.
fn value_expr(kind: &AssignmentKind, base: &Base, may_be_null: bool) -> RenderExpr {
    match kind {
        AssignmentKind::DirectCopy { source } => path_expr(source, base),
        AssignmentKind::EnumConvert { source, .. } => {
            let value_type = ENUM_VALUE_TYPE.clickhouse_type();
            let to_type = if may_be_null || source.hops.iter().any(|h| h.nullable) {
                format!("Nullable({})", value_type)
            } else {
                value_type.to_string()
            };
            RenderExpr::Cast {
                expr: Box::new(path_expr(source, base)),
                to_type,
            }
        }
        AssignmentKind::Nested { source_field, plan } => {
            tuple_expr(plan, &Base::Expr(base.field(source_field)), may_be_null)
        }
        AssignmentKind::ConditionalNested { source_field, plan } => {
            let parent = base.field(source_field);
            tuple_expr(plan, &Base::Expr(parent.clone()), true).null_guarded_by(&parent)
        }
        AssignmentKind::Collection {
            source_field,
            element_plan,
        } => {
            let param = format!("x{}", element_plan.depth);
            let element = Base::Expr(RenderExpr::LambdaParam(param.clone()));
            let body = tuple_expr(element_plan, &element, false);
            RenderExpr::ArrayMap {
                param,
                body: Box::new(body),
                array: Box::new(base.field(source_field)),
            }
        }
    }
}

/// Positional tuple of every assignment in `plan`
fn tuple_expr(plan: &ProjectionPlan, base: &Base, may_be_null: bool) -> RenderExpr {
    RenderExpr::Tuple(
        plan.assignments
            .iter()
            .map(|a| value_expr(&a.kind, base, may_be_null))
            .collect(),
    )
}

/// Field access along a source path, null-guarding nullable intermediate hops
fn path_expr(path: &SourcePath, base: &Base) -> RenderExpr {
    let mut guards = Vec::new();
    let mut hops = path.hops.iter();
    let Some(first) = hops.next() else {
        return RenderExpr::Null;
    };

    let mut expr = base.field(&first.field);
    let mut nullable = first.nullable;
    for hop in hops {
        if nullable {
            guards.push(expr.clone());
        }
        expr = expr.field(&hop.field);
        nullable = hop.nullable;
    }

    guards
        .iter()
        .rev()
        .fold(expr, |expr, guard| expr.null_guarded_by(guard))
}
