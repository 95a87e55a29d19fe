//! Source/target field correspondence.
//!
//! For every target field, in target declaration order:
//! 1. an explicit-mapping override is resolved against the source shape
//!    (failure to resolve is a build error),
//! 2. otherwise the source field with the exact same name is used,
//! 3. otherwise the target field is dropped.
//!
//! Successful results are memoized per (source, target) pair. The computation
//! is deterministic, so two threads racing on the same miss store equal values.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::shape_catalog::registry::ShapeProvider;
use crate::shape_catalog::shape_schema::{FieldDescriptor, FieldKind, ShapeId};

use super::errors::PlanBuildError;
use super::plan::{MappingOrigin, SourcePath};

/// One matched target field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub target: FieldDescriptor,
    /// Source field on the source shape (first hop)
    pub source: FieldDescriptor,
    /// Field inside `source` for two-hop overrides
    pub subfield: Option<FieldDescriptor>,
    pub origin: MappingOrigin,
}

impl FieldMapping {
    /// The field whose value feeds the target (last hop)
    pub fn leaf(&self) -> &FieldDescriptor {
        self.subfield.as_ref().unwrap_or(&self.source)
    }

    pub fn source_path(&self) -> SourcePath {
        let path = SourcePath::field(&self.source.name, self.source.nullable);
        match &self.subfield {
            Some(sub) => path.then(&sub.name, sub.nullable),
            None => path,
        }
    }
}

type PairKey = (ShapeId, ShapeId);

#[derive(Debug, Default)]
pub struct FieldMatcher {
    cache: RwLock<HashMap<PairKey, Arc<Vec<FieldMapping>>>>,
}

impl FieldMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn match_fields(
        &self,
        provider: &dyn ShapeProvider,
        source: &ShapeId,
        target: &ShapeId,
    ) -> Result<Arc<Vec<FieldMapping>>, PlanBuildError> {
        let key = (source.clone(), target.clone());
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(found) = cache.get(&key) {
                return Ok(Arc::clone(found));
            }
        }

        let mappings = Arc::new(compute_mappings(provider, source, target)?);

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(key).or_insert(mappings)))
    }

    pub fn cached_pairs(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn compute_mappings(
    provider: &dyn ShapeProvider,
    source: &ShapeId,
    target: &ShapeId,
) -> Result<Vec<FieldMapping>, PlanBuildError> {
    let source_fields = provider.fields(source)?;
    let target_fields = provider.fields(target)?;
    let mut mappings = Vec::with_capacity(target_fields.len());

    for target_field in target_fields {
        if target_field.mapping.is_some() {
            mappings.push(resolve_override(provider, source_fields, target, target_field)?);
            continue;
        }

        match source_fields.iter().find(|f| f.name == target_field.name) {
            Some(source_field) => mappings.push(FieldMapping {
                target: target_field.clone(),
                source: source_field.clone(),
                subfield: None,
                origin: MappingOrigin::Structural,
            }),
            None => log::debug!(
                "{} -> {}: no source field for `{}`, dropped",
                source,
                target,
                target_field.name
            ),
        }
    }

    Ok(mappings)
}

fn resolve_override(
    provider: &dyn ShapeProvider,
    source_fields: &[FieldDescriptor],
    target: &ShapeId,
    target_field: &FieldDescriptor,
) -> Result<FieldMapping, PlanBuildError> {
    let unresolved = |missing_path: String| PlanBuildError::UnresolvedOverride {
        target_shape: target.to_string(),
        target_field: target_field.name.clone(),
        missing_path,
    };

    let Some(mapping) = target_field.mapping.as_ref() else {
        return Err(unresolved(target_field.name.clone()));
    };

    let source_field = source_fields
        .iter()
        .find(|f| f.name == mapping.source_field)
        .ok_or_else(|| unresolved(mapping.source_field.clone()))?;

    // Without a subfield, a related object is read through the target field's own name
    let subfield_name = match (&mapping.source_subfield, &source_field.kind) {
        (Some(sub), _) => Some(sub.clone()),
        (None, FieldKind::Nested(_)) => Some(target_field.name.clone()),
        (None, _) => None,
    };

    let subfield = match subfield_name {
        None => None,
        Some(sub) => {
            let path = format!("{}.{}", mapping.source_field, sub);
            let FieldKind::Nested(related) = &source_field.kind else {
                return Err(unresolved(path));
            };
            let found = provider
                .fields(related)?
                .iter()
                .find(|f| f.name == sub)
                .cloned()
                .ok_or_else(|| unresolved(path))?;
            Some(found)
        }
    };

    Ok(FieldMapping {
        target: target_field.clone(),
        source: source_field.clone(),
        subfield,
        origin: MappingOrigin::ExplicitOverride,
    })
}
