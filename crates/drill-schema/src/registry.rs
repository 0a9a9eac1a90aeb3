//! Named-schema lookup contract
//!
//! The registry's storage is not owned here; callers plug in any
//! [`SchemaRegistry`]. [`InMemoryRegistry`] covers tests and embedding.

use crate::error::LookupError;
use crate::schema::Schema;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Source of named schemas referenced by `jsonschema-reference` nodes
///
/// Lookups may suspend (I/O). Callers go through [`crate::SchemaCache`],
/// which memoizes results and coalesces concurrent lookups of one name.
#[async_trait]
pub trait SchemaRegistry: Send + Sync + 'static {
    /// Fetch the schema registered under `name`
    async fn lookup(&self, name: &str) -> Result<Schema, LookupError>;
}

#[async_trait]
impl<R: SchemaRegistry + ?Sized> SchemaRegistry for Arc<R> {
    async fn lookup(&self, name: &str) -> Result<Schema, LookupError> {
        (**self).lookup(name).await
    }
}

/// Thread-safe in-memory registry
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    schemas: DashMap<String, Schema>,
}

impl InMemoryRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a schema under `name`
    pub fn insert(&self, name: impl Into<String>, schema: Schema) {
        self.schemas.insert(name.into(), schema);
    }

    /// With a registered schema
    #[must_use]
    pub fn with(self, name: impl Into<String>, schema: Schema) -> Self {
        self.insert(name, schema);
        self
    }

    /// Remove a schema, returning it if present
    pub fn remove(&self, name: &str) -> Option<Schema> {
        self.schemas.remove(name).map(|(_, schema)| schema)
    }

    /// Number of registered schemas
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if no schemas are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[async_trait]
impl SchemaRegistry for InMemoryRegistry {
    async fn lookup(&self, name: &str) -> Result<Schema, LookupError> {
        self.schemas
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }
}
