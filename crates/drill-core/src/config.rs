//! Editor configuration
//!
//! Explicit, serializable configuration for an [`crate::EntityEditor`] and
//! the schema session it resolves through. Nothing is read from the
//! environment here; callers load it (e.g. from TOML) and pass it in.

use crate::error::EditorError;
use drill_schema::{SchemaCache, SchemaRegistry, DEFAULT_MAX_REFERENCE_DEPTH};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How navigation treats unresolved field errors in the columns being left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationPolicy {
    /// Refuse navigation while errors remain in the scope being left
    Strict,
    /// Navigate anyway and report the outstanding errors
    #[default]
    Permissive,
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Navigation policy with outstanding field errors
    pub navigation_policy: NavigationPolicy,
    /// Maximum nested reference expansion
    pub max_reference_depth: usize,
    /// Maximum named schemas held by the session cache
    pub schema_cache_capacity: u64,
    /// Optional expiry for cached named schemas
    pub schema_cache_ttl_secs: Option<u64>,
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML
    ///
    /// # Errors
    /// Returns `EditorError::Config` if the document is malformed
    pub fn from_toml_str(source: &str) -> Result<Self, EditorError> {
        toml::from_str(source).map_err(|e| EditorError::Config(e.to_string()))
    }

    /// With navigation policy
    #[inline]
    #[must_use]
    pub fn with_navigation_policy(mut self, policy: NavigationPolicy) -> Self {
        self.navigation_policy = policy;
        self
    }

    /// With reference depth cap
    #[inline]
    #[must_use]
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    /// With schema cache capacity
    #[inline]
    #[must_use]
    pub fn with_schema_cache_capacity(mut self, capacity: u64) -> Self {
        self.schema_cache_capacity = capacity;
        self
    }

    /// Start a schema session over `registry` sized by this configuration
    #[must_use]
    pub fn schema_cache(&self, registry: Arc<dyn SchemaRegistry>) -> SchemaCache {
        match self.schema_cache_ttl_secs {
            Some(secs) => SchemaCache::with_ttl(
                registry,
                self.schema_cache_capacity,
                Duration::from_secs(secs),
            ),
            None => SchemaCache::new(registry, self.schema_cache_capacity),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            navigation_policy: NavigationPolicy::default(),
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
            schema_cache_capacity: 1_000,
            schema_cache_ttl_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.navigation_policy, NavigationPolicy::Permissive);
        assert_eq!(config.max_reference_depth, DEFAULT_MAX_REFERENCE_DEPTH);
        assert_eq!(config.schema_cache_capacity, 1_000);
        assert_eq!(config.schema_cache_ttl_secs, None);
    }

    #[test]
    fn builders() {
        let config = EditorConfig::new()
            .with_navigation_policy(NavigationPolicy::Strict)
            .with_max_reference_depth(4)
            .with_schema_cache_capacity(10);
        assert_eq!(config.navigation_policy, NavigationPolicy::Strict);
        assert_eq!(config.max_reference_depth, 4);
        assert_eq!(config.schema_cache_capacity, 10);
    }

    #[test]
    fn from_toml_partial() {
        let config = EditorConfig::from_toml_str(
            r#"
            navigation_policy = "strict"
            schema_cache_ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.navigation_policy, NavigationPolicy::Strict);
        assert_eq!(config.schema_cache_ttl_secs, Some(60));
        assert_eq!(config.max_reference_depth, DEFAULT_MAX_REFERENCE_DEPTH);
    }

    #[test]
    fn from_toml_rejects_unknown_policy() {
        let result = EditorConfig::from_toml_str(r#"navigation_policy = "lenient""#);
        assert!(matches!(result, Err(EditorError::Config(_))));
    }
}
