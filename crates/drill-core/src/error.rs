//! Error types for the entity editor
//!
//! Provides error handling for:
//! - Operations on the wrong effective type (rejected, no mutation)
//! - Paths and columns that do not exist
//! - Navigation and save gating by outstanding field errors
//!
//! Field-level validation messages are data held by
//! [`crate::ValidationAggregator`], not errors.

use drill_schema::{DataPath, SchemaError};

/// Main editor error type
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// No entity is open
    #[error("no entity is open")]
    NoEntityOpen,

    /// Operation does not apply to the effective schema at this path
    #[error("invalid operation at '{path}': {reason}")]
    InvalidOperation { path: DataPath, reason: String },

    /// Path does not exist in the entity tree
    #[error("path not found: '{0}'")]
    PathNotFound(DataPath),

    /// Column index beyond the current stack
    #[error("column {index} out of range (stack has {len})")]
    ColumnOutOfRange { index: usize, len: usize },

    /// A column referenced a path no longer present in the tree
    #[error("stale column at '{path}'")]
    StaleColumn { path: DataPath },

    /// Strict navigation refused because of outstanding field errors
    #[error("navigation from '{from}' blocked by {} field error(s)", .errors.len())]
    NavigationBlocked { from: DataPath, errors: Vec<DataPath> },

    /// Save refused because of outstanding field errors
    #[error("save blocked by {} field error(s)", .errors.len())]
    SaveBlocked { errors: Vec<DataPath> },

    /// Staged item no longer matches the open entity
    #[error("staged item for '{path}' is stale")]
    StaleStagedItem { path: DataPath },

    /// Schema resolution failed
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl EditorError {
    /// Create invalid operation error for path
    pub fn invalid_operation(path: &DataPath, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    /// Check if the error left the editor untouched and can be retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NavigationBlocked { .. } | Self::SaveBlocked { .. } | Self::StaleStagedItem { .. }
        )
    }
}

/// Result type alias for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_operation_display() {
        let path: DataPath = "tags.0".parse().unwrap();
        let err = EditorError::invalid_operation(&path, "not an array");
        assert_eq!(err.to_string(), "invalid operation at 'tags.0': not an array");
    }

    #[test]
    fn navigation_blocked_counts_errors() {
        let err = EditorError::NavigationBlocked {
            from: DataPath::root(),
            errors: vec!["a".parse().unwrap(), "b".parse().unwrap()],
        };
        assert!(err.to_string().contains("2 field error(s)"));
        assert!(err.is_retryable());
    }

    #[test]
    fn schema_error_converts() {
        let err: EditorError = SchemaError::MissingReferenceName.into();
        assert!(matches!(err, EditorError::Schema(_)));
        assert!(!err.is_retryable());
    }
}
