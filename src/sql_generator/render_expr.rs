use serde::{Deserialize, Serialize};

use super::ToSql;

/// ClickHouse expression tree a projection plan is lowered into
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum RenderExpr {
    /// `alias.column`
    Column { table_alias: String, column: String },
    /// Lambda parameter inside `arrayMap`
    LambdaParam(String),
    /// Named member of a tuple-typed expression
    TupleElement { tuple: Box<RenderExpr>, name: String },
    IsNull(Box<RenderExpr>),
    If {
        condition: Box<RenderExpr>,
        then: Box<RenderExpr>,
        otherwise: Box<RenderExpr>,
    },
    Cast { expr: Box<RenderExpr>, to_type: String },
    ArrayMap {
        param: String,
        body: Box<RenderExpr>,
        array: Box<RenderExpr>,
    },
    Tuple(Vec<RenderExpr>),
    Null,
}

impl RenderExpr {
    /// Access a named field of this expression's value
    pub fn field(&self, name: &str) -> RenderExpr {
        RenderExpr::TupleElement {
            tuple: Box::new(self.clone()),
            name: name.to_string(),
        }
    }

    /// `if(isNull(guard), NULL, self)`
    pub fn null_guarded_by(self, guard: &RenderExpr) -> RenderExpr {
        RenderExpr::If {
            condition: Box::new(RenderExpr::IsNull(Box::new(guard.clone()))),
            then: Box::new(RenderExpr::Null),
            otherwise: Box::new(self),
        }
    }
}

impl ToSql for RenderExpr {
    fn to_sql(&self) -> String {
        match self {
            RenderExpr::Column {
                table_alias,
                column,
            } => format!("{}.{}", table_alias, quote_identifier(column)),
            RenderExpr::LambdaParam(name) => name.clone(),
            RenderExpr::TupleElement { tuple, name } => {
                format!("tupleElement({}, '{}')", tuple.to_sql(), name.replace('\'', "\\'"))
            }
            RenderExpr::IsNull(expr) => format!("isNull({})", expr.to_sql()),
            RenderExpr::If {
                condition,
                then,
                otherwise,
            } => format!(
                "if({}, {}, {})",
                condition.to_sql(),
                then.to_sql(),
                otherwise.to_sql()
            ),
            RenderExpr::Cast { expr, to_type } => format!("CAST({} AS {})", expr.to_sql(), to_type),
            RenderExpr::ArrayMap { param, body, array } => {
                format!("arrayMap({} -> {}, {})", param, body.to_sql(), array.to_sql())
            }
            RenderExpr::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|i| i.to_sql()).collect();
                format!("tuple({})", items.join(", "))
            }
            RenderExpr::Null => "NULL".to_string(),
        }
    }
}

/// Backtick-quote an identifier
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
