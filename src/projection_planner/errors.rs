use thiserror::Error;

use crate::shape_catalog::errors::ShapeCatalogError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanBuildError {
    #[error(
        "Explicit mapping on `{target_shape}.{target_field}` cannot be resolved: source has no `{missing_path}`"
    )]
    UnresolvedOverride {
        target_shape: String,
        target_field: String,
        missing_path: String,
    },

    #[error(
        "Explicit mapping on `{target_shape}.{target_field}` reads `{source_path}`, which is {found} (expected {expected})"
    )]
    IncompatibleOverride {
        target_shape: String,
        target_field: String,
        source_path: String,
        expected: String,
        found: String,
    },

    #[error("Shape catalog error: {0}")]
    Catalog(#[from] ShapeCatalogError),
}
