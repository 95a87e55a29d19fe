pub mod config;
pub mod errors;
pub mod registry;
pub mod scalar_types;
pub mod shape_schema;

pub use config::ShapeCatalogConfig;
pub use errors::ShapeCatalogError;
pub use registry::{ShapeProvider, ShapeRegistry, ShapeRegistryBuilder};
pub use scalar_types::ScalarType;
pub use shape_schema::{
    EnumDescriptor, EnumMember, FieldDescriptor, FieldKind, FieldOverride, ShapeDescriptor,
    ShapeId,
};
