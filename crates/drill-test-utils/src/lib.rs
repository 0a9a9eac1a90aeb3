//! Testing utilities for the drill workspace
//!
//! Shared registries, fixture schemas and editor setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use drill_core::{EditorConfig, EntityEditor};
use drill_schema::{
    DataPath, InMemoryRegistry, LookupError, Schema, SchemaCache, SchemaRegistry, SchemaResolver,
    SchemaType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Registry wrapper that counts lookups and can slow them down
#[derive(Debug, Default)]
pub struct CountingRegistry {
    inner: InMemoryRegistry,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingRegistry {
    pub fn new(inner: InMemoryRegistry) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &InMemoryRegistry {
        &self.inner
    }
}

#[async_trait]
impl SchemaRegistry for CountingRegistry {
    async fn lookup(&self, name: &str) -> Result<Schema, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.lookup(name).await
    }
}

pub fn string() -> Schema {
    Schema::of_type(SchemaType::String)
}

/// `{ tags: [{ name: string }] }`
pub fn tags_schema() -> Schema {
    Schema::object([("tags", Schema::array(Schema::object([("name", string())])))])
}

/// `user` and `tag` named schemas
pub fn user_registry() -> InMemoryRegistry {
    InMemoryRegistry::new()
        .with(
            "user",
            Schema::object([
                ("id", string()),
                ("email", string()),
                ("tags", Schema::reference("tag", true)),
            ]),
        )
        .with("tag", Schema::object([("name", string())]))
}

/// Self-referential `person` schema
pub fn person_registry() -> InMemoryRegistry {
    InMemoryRegistry::new().with(
        "person",
        Schema::object([
            ("name", string()),
            ("manager", Schema::reference("person", false)),
            ("reports", Schema::reference("person", true)),
        ]),
    )
}

pub fn resolver(registry: impl SchemaRegistry) -> SchemaResolver {
    SchemaResolver::new(SchemaCache::new(Arc::new(registry), 100))
}

pub fn setup_editor(registry: InMemoryRegistry) -> EntityEditor {
    EntityEditor::with_config(Arc::new(registry), EditorConfig::new())
}

pub fn setup_editor_with(registry: Arc<dyn SchemaRegistry>, config: EditorConfig) -> EntityEditor {
    EntityEditor::with_config(registry, config)
}

pub fn path(s: &str) -> DataPath {
    s.parse().unwrap()
}
