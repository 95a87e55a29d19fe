use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Planner configuration with validation.
///
/// The depth settings reproduce the limits projections have always been built
/// with (collections at the top level only, nested objects two levels deep)
/// but can be tuned per deployment.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Deepest recursion level at which collections are expanded
    #[validate(range(
        min = 1,
        max = 8,
        message = "Collection depth must be between 1 and 8"
    ))]
    pub collection_depth: u32,

    /// Recursion level element sub-plans start at
    #[validate(range(
        min = 1,
        max = 64,
        message = "Collection element depth must be between 1 and 64"
    ))]
    pub collection_element_depth: u32,

    /// Nested objects deeper than this are omitted unless children are loaded
    #[validate(range(
        min = 1,
        max = 64,
        message = "Max nested depth must be between 1 and 64"
    ))]
    pub max_nested_depth: u32,

    /// Absolute recursion ceiling, honoured even when children are loaded
    #[validate(range(
        min = 1,
        max = 256,
        message = "Hard depth limit must be between 1 and 256"
    ))]
    pub hard_depth_limit: u32,

    /// Whether compiled plans are memoized
    pub plan_cache_enabled: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            collection_depth: 1,
            collection_element_depth: 3,
            max_nested_depth: 2,
            hard_depth_limit: 16,
            plan_cache_enabled: true,
        }
    }
}

impl ProjectionConfig {
    /// Field range checks plus the cross-field depth ordering
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.max_nested_depth > self.hard_depth_limit {
            let mut err = ValidationError::new("depth_order");
            err.message = Some("max_nested_depth cannot exceed hard_depth_limit".into());
            let mut errors = ValidationErrors::new();
            errors.add("max_nested_depth", err);
            return Err(ConfigError::Validation(errors));
        }
        Ok(())
    }

    /// Create configuration from environment variables (and `.env`) with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            collection_depth: parse_env_var("SHAPEPROJ_COLLECTION_DEPTH", "1")?,
            collection_element_depth: parse_env_var("SHAPEPROJ_COLLECTION_ELEMENT_DEPTH", "3")?,
            max_nested_depth: parse_env_var("SHAPEPROJ_MAX_NESTED_DEPTH", "2")?,
            hard_depth_limit: parse_env_var("SHAPEPROJ_HARD_DEPTH_LIMIT", "16")?,
            plan_cache_enabled: parse_env_var("SHAPEPROJ_PLAN_CACHE_ENABLED", "true")?,
        };

        config.check()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.check()?;
        Ok(config)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
