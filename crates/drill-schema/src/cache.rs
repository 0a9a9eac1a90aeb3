//! Session-scoped named-schema cache using moka
//!
//! Memoizes registry lookups by schema name for the lifetime of a session.
//! Concurrent lookups of one name coalesce into a single registry call.
//! Effective schemas resolved from a name are memoized beside the raw
//! schema, so every reference to one name shares a single expanded node.

use crate::effective::EffectiveSchema;
use crate::error::{LookupError, SchemaError};
use crate::registry::SchemaRegistry;
use crate::schema::Schema;
use moka::future::Cache;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Named-schema cache bound to one registry
///
/// Explicit session state: created when a session starts, shared by
/// cloning, invalidated when the registry reports a change, torn down when
/// the last clone is dropped. Failed lookups are never cached.
#[derive(Clone)]
pub struct SchemaCache {
    inner: Cache<String, Arc<Schema>>,
    resolved: Cache<String, Arc<EffectiveSchema>>,
    registry: Arc<dyn SchemaRegistry>,
}

impl SchemaCache {
    /// Create cache with max capacity
    #[must_use]
    pub fn new(registry: Arc<dyn SchemaRegistry>, max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            resolved: Cache::new(max_capacity),
            registry,
        }
    }

    /// Create cache with time-based expiration
    #[must_use]
    pub fn with_ttl(registry: Arc<dyn SchemaRegistry>, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            resolved: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            registry,
        }
    }

    /// Get schema by name, fetching from the registry on a miss
    ///
    /// # Errors
    /// - `SchemaError::NotFound` if the registry has no such schema
    /// - `SchemaError::Lookup` if the registry failed
    pub async fn get_or_fetch(&self, name: &str) -> Result<Arc<Schema>, SchemaError> {
        let registry = Arc::clone(&self.registry);
        let owned = name.to_string();
        self.inner
            .try_get_with(owned.clone(), async move {
                tracing::debug!(schema = %owned, "fetching named schema");
                registry.lookup(&owned).await.map(Arc::new)
            })
            .await
            .map_err(|err: Arc<LookupError>| SchemaError::from((*err).clone()))
    }

    /// Get schema from cache without fetching
    #[inline]
    pub async fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.inner.get(name).await
    }

    /// Insert schema into cache
    #[inline]
    pub async fn insert(&self, name: impl Into<String>, schema: Schema) {
        self.inner.insert(name.into(), Arc::new(schema)).await;
    }

    /// Effective schema previously resolved from `name`
    #[inline]
    pub(crate) async fn get_resolved(&self, name: &str) -> Option<Arc<EffectiveSchema>> {
        self.resolved.get(name).await
    }

    /// Memoize the effective schema resolved from `name`
    #[inline]
    pub(crate) async fn insert_resolved(&self, name: &str, effective: Arc<EffectiveSchema>) {
        self.resolved.insert(name.to_string(), effective).await;
    }

    /// Drop one schema after a registry change notification
    ///
    /// Every memoized effective schema goes with it, since any of them may
    /// have expanded `name` somewhere below the root.
    #[inline]
    pub async fn invalidate(&self, name: &str) {
        tracing::debug!(schema = name, "invalidating named schema");
        self.inner.invalidate(name).await;
        self.resolved.invalidate_all();
    }

    /// Drop every schema
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
        self.resolved.invalidate_all();
    }

    /// Check if a schema is cached
    #[inline]
    pub async fn contains(&self, name: &str) -> bool {
        self.inner.get(name).await.is_some()
    }

    /// Flush pending maintenance so counts are exact
    #[inline]
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
        self.resolved.run_pending_tasks().await;
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Debug for SchemaCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entry_count", &self.inner.entry_count())
            .field("resolved_count", &self.resolved.entry_count())
            .finish_non_exhaustive()
    }
}
