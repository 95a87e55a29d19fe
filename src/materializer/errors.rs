use thiserror::Error;

use crate::shape_catalog::errors::ShapeCatalogError;

/// Raised when a source instance does not conform to the shape its plan was
/// compiled for. A compiled plan itself never causes these.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MaterializeError {
    #[error("Expected an object for shape `{shape}`, found {found}")]
    NotAnObject { shape: String, found: String },

    #[error("Expected an array for collection `{field}`, found {found}")]
    NotAnArray { field: String, found: String },

    #[error("Field `{shape}.{field}` is not nullable but the source value is null")]
    UnexpectedNull { shape: String, field: String },

    #[error("`{member}` is not a member of enum `{enum_name}`")]
    UnknownEnumMember { enum_name: String, member: String },

    #[error("Field `{field}` holds {found}, which is not an enum value")]
    InvalidEnumValue { field: String, found: String },

    #[error("Shape catalog error: {0}")]
    Catalog(#[from] ShapeCatalogError),
}
