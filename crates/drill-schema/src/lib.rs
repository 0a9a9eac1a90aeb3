//! Drill Schema
//!
//! Schema side of the drill-down editor: authored schema nodes, named-schema
//! lookup, effective schema resolution and default value synthesis.
//!
//! # Core Concepts
//!
//! - [`Schema`]: JSON-Schema-like node as authored, possibly with references
//! - [`SchemaRegistry`]: async lookup of named schemas (storage not owned here)
//! - [`SchemaCache`]: session-scoped, coalescing memo of registry lookups
//! - [`SchemaResolver`]: expands references into an [`EffectiveSchema`]
//! - [`synthesize`]: structurally complete default value for a schema
//! - [`DataPath`]: key/index path shared by schema, data and validation
//!
//! # Example
//!
//! ```rust,ignore
//! use drill_schema::{InMemoryRegistry, Schema, SchemaCache, SchemaResolver, synthesize};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = InMemoryRegistry::new().with("user", user_schema);
//! let resolver = SchemaResolver::new(SchemaCache::new(Arc::new(registry), 1_000));
//!
//! let effective = resolver.resolve(&Schema::reference("user", true)).await?;
//! assert_eq!(synthesize(&effective), serde_json::json!([]));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod cache;
mod effective;
mod error;
mod path;
mod registry;
mod resolver;
mod schema;
mod synthesize;

// Re-exports
pub use cache::{CacheStats, SchemaCache};
pub use effective::{Child, EffectiveSchema, Shape};
pub use error::{LookupError, SchemaDiagnostic, SchemaError, SchemaResult};
pub use path::{DataPath, PathError, Segment};
pub use registry::{InMemoryRegistry, SchemaRegistry};
pub use resolver::{SchemaResolver, DEFAULT_MAX_REFERENCE_DEPTH};
pub use schema::{PrimitiveType, Schema, SchemaKind, SchemaType};
pub use synthesize::{synthesize, synthesize_child};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
