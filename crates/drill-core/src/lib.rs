//! Drill Core - entity drill-down editor
//!
//! Keeps one entity open and drives all edits to it:
//! - Breadcrumb columns, each bound to a path and its effective schema
//! - Atomic mutations (navigate, add/remove array items, set values)
//! - Path-keyed field errors that gate navigation and saving
//!
//! Schema resolution and default synthesis live in [`drill_schema`].
//!
//! # Example
//!
//! ```rust,ignore
//! use drill_core::{EditorConfig, EntityEditor};
//! use drill_schema::{DataPath, InMemoryRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut editor = EntityEditor::with_config(Arc::new(InMemoryRegistry::new()), EditorConfig::new());
//! editor.open_entity(&schema, serde_json::Value::Null).await?;
//!
//! editor.navigate(0, "tags").await?;
//! let index = editor.add_array_item(&"tags".parse()?).await?;
//! editor.navigate(1, index).await?;
//! editor.set_value(&"tags.0.name".parse()?, "x".into())?;
//!
//! editor.ensure_savable()?;
//! let data = editor.into_data();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod column;
pub mod config;
pub mod editor;
pub mod error;
pub mod tree;
pub mod validation;

// Re-exports for convenience
pub use column::{Column, ColumnSchema, ColumnStack};
pub use config::{EditorConfig, NavigationPolicy};
pub use editor::{ArrayItem, EntityEditor, NavigationOutcome, StagedItem};
pub use error::{EditorError, EditorResult};
pub use tree::EntityTree;
pub use validation::ValidationAggregator;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Drill Core
    pub use crate::{
        ArrayItem, Column, ColumnSchema, EditorConfig, EditorError, EditorResult, EntityEditor,
        NavigationOutcome, NavigationPolicy,
    };
    pub use drill_schema::{DataPath, Schema, SchemaRegistry, Segment};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
