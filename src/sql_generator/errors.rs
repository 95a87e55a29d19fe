use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlGenerationError {
    #[error("Projection {source_shape} -> {target_shape} has no assignments (nothing to select)")]
    EmptyPlan {
        source_shape: String,
        target_shape: String,
    },
    #[error("Invalid table alias '{0}' (must be a plain identifier)")]
    InvalidTableAlias(String),
    #[error("Invalid table name '{0}' (expected `table` or `database.table`)")]
    InvalidTableName(String),
}
