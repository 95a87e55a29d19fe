//! Shapeproj - compiled projections between structural shapes
//!
//! This crate maps instances of one shape onto another through:
//! - A shape catalogue (Rust builders or YAML)
//! - Name-based field matching with explicit overrides
//! - Depth-bounded, cached projection plans
//! - In-process materialization of JSON instances
//! - ClickHouse SQL pushdown of compiled plans

pub mod config;
pub mod materializer;
pub mod projection_planner;
pub mod shape_catalog;
pub mod sql_generator;

pub use config::{ConfigError, ProjectionConfig};
pub use materializer::{EnumOutput, MaterializeError, Materializer};
pub use projection_planner::{
    PlanBuildError, ProjectionOptions, ProjectionPlan, ProjectionPlanner,
};
pub use shape_catalog::{ShapeCatalogConfig, ShapeCatalogError, ShapeProvider, ShapeRegistry, ShapeId};
pub use sql_generator::{translate, SqlGenerationError, SqlOptions, ToSql};
