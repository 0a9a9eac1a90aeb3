//! Error types for schema lookup and resolution
//!
//! - Lookup failures reported by a [`crate::SchemaRegistry`]
//! - Resolution failures (missing named schema, runaway reference chains)
//! - [`SchemaDiagnostic`], the displayable form kept on placeholders

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Errors reported by a schema registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No schema registered under this name
    #[error("no schema named '{0}'")]
    NotFound(String),

    /// Registry backend failed
    #[error("registry failed for '{name}': {message}")]
    Backend { name: String, message: String },
}

impl LookupError {
    /// Create backend error for name
    pub fn backend(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors during effective schema resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Named reference cannot be resolved
    #[error("referenced schema not found: '{name}'")]
    NotFound { name: String },

    /// Registry failed while looking up a reference
    #[error("lookup of '{name}' failed: {message}")]
    Lookup { name: String, message: String },

    /// Reference node without `referencedSchemaName`
    #[error("reference node has no referencedSchemaName")]
    MissingReferenceName,

    /// Reference resolves to itself without passing through an object or array
    #[error("reference cycle through '{name}'")]
    ReferenceCycle { name: String },

    /// Reference expansion nested deeper than allowed
    #[error("reference expansion exceeded depth {depth} at '{name}'")]
    ReferenceDepthExceeded { name: String, depth: usize },
}

impl SchemaError {
    /// Name of the reference that failed, if any
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::NotFound { name }
            | Self::Lookup { name, .. }
            | Self::ReferenceCycle { name }
            | Self::ReferenceDepthExceeded { name, .. } => Some(name),
            Self::MissingReferenceName => None,
        }
    }

    /// Displayable form for placeholders
    #[must_use]
    pub fn diagnostic(&self) -> SchemaDiagnostic {
        SchemaDiagnostic {
            reference: self.reference().map(str::to_string),
            message: self.to_string(),
        }
    }
}

impl From<LookupError> for SchemaError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(name) => Self::NotFound { name },
            LookupError::Backend { name, message } => Self::Lookup { name, message },
        }
    }
}

/// Visible diagnostic for a schema that could not be resolved
///
/// Kept on unresolved children and on placeholder columns so the failure is
/// shown instead of degrading to an untyped form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiagnostic {
    /// Reference name that failed, if the failure was a reference
    pub reference: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl Display for SchemaDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result type alias for resolution
pub type SchemaResult<T> = Result<T, SchemaError>;
