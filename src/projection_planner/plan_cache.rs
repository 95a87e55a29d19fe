//! Plan cache module for memoizing compiled projection plans
//!
//! # Architecture
//!
//! Cache Key: (source shape, target shape, load_children)
//! Cache Value: immutable `Arc<ProjectionPlan>`
//!
//! Shapes are static for the life of the process, so entries are never evicted
//! or invalidated. Concurrent first builds of the same key may both run the
//! builder; the first value stored wins and every caller gets that same `Arc`.
//!
//! # Configuration
//!
//! Environment variables (through `ProjectionConfig::from_env`):
//! - `SHAPEPROJ_PLAN_CACHE_ENABLED` (default: true)
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::shape_catalog::shape_schema::ShapeId;

use super::plan::ProjectionPlan;

/// Key for cache lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanCacheKey {
    pub source_shape: ShapeId,
    pub target_shape: ShapeId,
    pub load_children: bool,
}

impl PlanCacheKey {
    pub fn new(source_shape: &ShapeId, target_shape: &ShapeId, load_children: bool) -> Self {
        PlanCacheKey {
            source_shape: source_shape.clone(),
            target_shape: target_shape.clone(),
            load_children,
        }
    }
}

/// Write-once plan store
pub struct PlanCache {
    entries: RwLock<HashMap<PlanCacheKey, Arc<ProjectionPlan>>>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PlanCache {
    pub fn new(enabled: bool) -> Self {
        PlanCache {
            entries: RwLock::new(HashMap::new()),
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get a plan from cache
    ///
    /// Returns None if not cached (or caching is disabled)
    pub fn get(&self, key: &PlanCacheKey) -> Option<Arc<ProjectionPlan>> {
        if !self.enabled {
            return None;
        }

        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(plan) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(plan))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a plan, returning whichever plan is now cached under the key.
    ///
    /// If another thread stored the key first, its plan is kept and returned.
    pub fn insert(&self, key: PlanCacheKey, plan: ProjectionPlan) -> Arc<ProjectionPlan> {
        let plan = Arc::new(plan);
        if !self.enabled {
            return plan;
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(key).or_insert(plan))
    }

    /// Return the cached plan or build, store and return a new one
    pub fn get_or_try_insert_with<E, F>(
        &self,
        key: PlanCacheKey,
        build: F,
    ) -> Result<Arc<ProjectionPlan>, E>
    where
        F: FnOnce() -> Result<ProjectionPlan, E>,
    {
        if let Some(plan) = self.get(&key) {
            log::trace!(
                "Plan cache hit: {} -> {} (load_children={})",
                key.source_shape,
                key.target_shape,
                key.load_children
            );
            return Ok(plan);
        }

        let plan = build()?;
        Ok(self.insert(key, plan))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
        }
    }
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Cache metrics for monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheMetrics {
    /// Calculate cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
