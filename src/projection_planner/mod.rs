//! Projection planner: field matching, plan construction and plan caching.
//!
//! [`ProjectionPlanner`] is the entry point. It is `Send + Sync` and meant to be
//! shared for the life of the process (one per shape catalogue), so that
//! every caller hits the same plan cache.

use std::sync::Arc;

use crate::config::ProjectionConfig;
use crate::shape_catalog::registry::ShapeProvider;
use crate::shape_catalog::shape_schema::ShapeId;

pub mod errors;
pub mod field_matcher;
pub mod plan;
pub mod plan_builder;
pub mod plan_cache;

pub use errors::PlanBuildError;
pub use field_matcher::{FieldMapping, FieldMatcher};
pub use plan::{
    AssignmentKind, FieldAssignment, MappingOrigin, PathHop, ProjectionPlan, SourcePath,
};
pub use plan_builder::PlanBuilder;
pub use plan_cache::{CacheMetrics, PlanCache, PlanCacheKey};

/// Per-call compilation options (part of the cache key)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProjectionOptions {
    /// Expand nested objects past the default nesting ceiling
    pub load_children: bool,
}

impl ProjectionOptions {
    pub fn with_children() -> Self {
        ProjectionOptions {
            load_children: true,
        }
    }
}

/// Recursion limits applied while building plans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub collection_depth: u32,
    pub collection_element_depth: u32,
    pub max_nested_depth: u32,
    pub hard_depth_limit: u32,
}

impl Default for PlanLimits {
    fn default() -> Self {
        PlanLimits::from(&ProjectionConfig::default())
    }
}

impl From<&ProjectionConfig> for PlanLimits {
    fn from(config: &ProjectionConfig) -> Self {
        PlanLimits {
            collection_depth: config.collection_depth,
            collection_element_depth: config.collection_element_depth,
            max_nested_depth: config.max_nested_depth,
            hard_depth_limit: config.hard_depth_limit,
        }
    }
}

pub struct ProjectionPlanner {
    provider: Arc<dyn ShapeProvider>,
    matcher: FieldMatcher,
    cache: PlanCache,
    limits: PlanLimits,
}

impl ProjectionPlanner {
    pub fn new(provider: Arc<dyn ShapeProvider>, config: &ProjectionConfig) -> Self {
        ProjectionPlanner {
            provider,
            matcher: FieldMatcher::new(),
            cache: PlanCache::new(config.plan_cache_enabled),
            limits: PlanLimits::from(config),
        }
    }

    pub fn with_defaults(provider: Arc<dyn ShapeProvider>) -> Self {
        Self::new(provider, &ProjectionConfig::default())
    }

    /// Compile (or fetch the cached) plan projecting `source` instances onto `target`.
    ///
    /// Fails only when an explicit-mapping override on the target cannot be
    /// resolved against the source, or a shape is not registered. Failures are
    /// not cached; retrying reproduces the same error.
    pub fn compile_projection(
        &self,
        source: &ShapeId,
        target: &ShapeId,
        options: ProjectionOptions,
    ) -> Result<Arc<ProjectionPlan>, PlanBuildError> {
        let key = PlanCacheKey::new(source, target, options.load_children);
        self.cache.get_or_try_insert_with(key, || {
            let builder = PlanBuilder::new(self.provider.as_ref(), &self.matcher, self.limits, options);
            let plan = builder.build(source, target)?;
            log::info!(
                "Compiled projection {} -> {} (load_children={}): {} assignments, depth {}",
                source,
                target,
                options.load_children,
                plan.node_count(),
                plan.max_depth()
            );
            Ok(plan)
        })
    }

    pub fn provider(&self) -> &dyn ShapeProvider {
        self.provider.as_ref()
    }

    pub fn limits(&self) -> PlanLimits {
        self.limits
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }
}
