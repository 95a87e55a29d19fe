//! # Shape Catalog Error Types
//!
//! Errors raised while registering shapes and enums, or while loading a shape
//! catalogue from YAML.
//!
//! ## Error Categories
//!
//! - **Lookup Errors**: a shape or enum that was never registered
//! - **Registration Errors**: duplicates, bad identifiers, dangling references
//! - **Configuration Errors**: file I/O and parsing issues during catalogue loading

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShapeCatalogError {
    #[error("No shape registered as `{shape}`")]
    UnknownShape { shape: String },
    #[error("No enum type registered as `{enum_name}`")]
    UnknownEnum { enum_name: String },
    #[error("Shape `{shape}` is registered twice")]
    DuplicateShape { shape: String },
    #[error("Enum type `{enum_name}` is registered twice")]
    DuplicateEnum { enum_name: String },
    #[error("Shape `{shape}` declares field `{field}` more than once")]
    DuplicateField { shape: String, field: String },
    #[error("Enum type `{enum_name}` declares member `{member}` more than once")]
    DuplicateEnumMember { enum_name: String, member: String },
    #[error("Invalid identifier '{name}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { name: String },
    #[error("Field `{shape}.{field}` references unknown {reference}")]
    DanglingReference {
        shape: String,
        field: String,
        reference: String,
    },
    #[error("Invalid definition for field `{shape}.{field}`: {message}")]
    InvalidField {
        shape: String,
        field: String,
        message: String,
    },
    #[error("Unknown scalar type '{type_name}'")]
    UnknownScalarType { type_name: String },
    #[error("Failed to read shape catalogue: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse shape catalogue: {error}")]
    ConfigParseError { error: String },
}

impl ShapeCatalogError {
    /// Create an InvalidField error for a field of a shape
    pub fn invalid_field(
        shape: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ShapeCatalogError::InvalidField {
            shape: shape.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
