//! Breadcrumb column stack
//!
//! A [`ColumnStack`] is the ordered list of columns the user has drilled
//! through. Column `i + 1` always sits exactly one segment below column `i`.
//! Columns are appended whole: the caller computes the child schema before
//! extending, so there is no loading state.

use crate::error::{EditorError, EditorResult};
use crate::tree::EntityTree;
use drill_schema::{DataPath, EffectiveSchema, SchemaDiagnostic, Segment};
use serde_json::Value;
use std::sync::Arc;

/// Schema bound to a column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSchema {
    /// Fully resolved effective schema
    Resolved(Arc<EffectiveSchema>),
    /// Resolution failed; shown as a non-navigable placeholder
    Placeholder(SchemaDiagnostic),
}

impl ColumnSchema {
    /// Effective schema, unless this is a placeholder
    #[inline]
    #[must_use]
    pub fn effective(&self) -> Option<&Arc<EffectiveSchema>> {
        match self {
            Self::Resolved(schema) => Some(schema),
            Self::Placeholder(_) => None,
        }
    }

    /// Diagnostic, if this is a placeholder
    #[inline]
    #[must_use]
    pub fn diagnostic(&self) -> Option<&SchemaDiagnostic> {
        match self {
            Self::Resolved(_) => None,
            Self::Placeholder(diagnostic) => Some(diagnostic),
        }
    }

    /// Check if columns can be opened beneath this one
    #[inline]
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        self.effective().is_some_and(|schema| schema.is_navigable())
    }
}

/// One breadcrumb column: a path and the schema resolved for it
///
/// The data slice is not copied into the column; read it through
/// [`Column::data`] against the owning tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    path: DataPath,
    schema: ColumnSchema,
}

impl Column {
    /// Create column
    #[inline]
    #[must_use]
    pub fn new(path: DataPath, schema: ColumnSchema) -> Self {
        Self { path, schema }
    }

    /// Path of this column
    #[inline]
    #[must_use]
    pub fn path(&self) -> &DataPath {
        &self.path
    }

    /// Schema of this column
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Effective schema, unless this is a placeholder
    #[inline]
    #[must_use]
    pub fn effective(&self) -> Option<&Arc<EffectiveSchema>> {
        self.schema.effective()
    }

    /// Check if columns can be opened beneath this one
    #[inline]
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        self.schema.is_navigable()
    }

    /// Check if this column is a placeholder
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self.schema, ColumnSchema::Placeholder(_))
    }

    /// Live data slice for this column
    #[inline]
    #[must_use]
    pub fn data<'a>(&self, tree: &'a EntityTree) -> Option<&'a Value> {
        tree.get(&self.path)
    }
}

/// Ordered breadcrumb columns
#[derive(Debug, Clone, Default)]
pub struct ColumnStack {
    columns: Vec<Column>,
}

impl ColumnStack {
    /// Create empty stack (no entity open)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to a single root column
    pub fn open(&mut self, root: ColumnSchema) {
        self.columns.clear();
        self.columns.push(Column::new(DataPath::root(), root));
    }

    /// Drop every column
    #[inline]
    pub fn clear(&mut self) {
        self.columns.clear();
    }

    /// All columns, root first
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the stack is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column at index
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Frontier column
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Column> {
        self.columns.last()
    }

    /// Column at index, or `ColumnOutOfRange`
    ///
    /// # Errors
    /// Returns `EditorError::ColumnOutOfRange` if `index` is past the frontier
    pub fn column(&self, index: usize) -> EditorResult<&Column> {
        self.columns.get(index).ok_or(EditorError::ColumnOutOfRange {
            index,
            len: self.columns.len(),
        })
    }

    /// Index of the column bound to exactly `path`
    #[must_use]
    pub fn index_of(&self, path: &DataPath) -> Option<usize> {
        self.columns.iter().position(|column| column.path() == path)
    }

    /// Drop every column after `index`
    ///
    /// # Errors
    /// Returns `EditorError::ColumnOutOfRange` if `index` is past the frontier
    pub fn truncate_after(&mut self, index: usize) -> EditorResult<()> {
        self.column(index)?;
        self.columns.truncate(index + 1);
        Ok(())
    }

    /// Truncate after `index`, then append a child column one segment below it
    ///
    /// Returns the index of the new column.
    ///
    /// # Errors
    /// - `EditorError::ColumnOutOfRange` if `index` is past the frontier
    /// - `EditorError::InvalidOperation` if the column at `index` is terminal
    pub fn extend_from(
        &mut self,
        index: usize,
        segment: Segment,
        schema: ColumnSchema,
    ) -> EditorResult<usize> {
        let parent = self.column(index)?;
        if !parent.is_navigable() {
            return Err(EditorError::invalid_operation(
                parent.path(),
                "column has no navigable children",
            ));
        }
        let path = parent.path().child(segment);

        self.columns.truncate(index + 1);
        self.columns.push(Column::new(path, schema));
        Ok(index + 1)
    }

    /// Drop every column strictly beneath `path`
    ///
    /// Returns the number of columns dropped.
    pub fn truncate_descendants(&mut self, path: &DataPath) -> usize {
        let before = self.columns.len();
        if let Some(first) = self
            .columns
            .iter()
            .position(|column| path.is_ancestor_of(column.path()))
        {
            self.columns.truncate(first);
        }
        before - self.columns.len()
    }

    /// Swap the schema of an existing column
    ///
    /// # Errors
    /// Returns `EditorError::ColumnOutOfRange` if `index` is past the frontier
    pub fn replace_schema(&mut self, index: usize, schema: ColumnSchema) -> EditorResult<()> {
        let len = self.columns.len();
        let column = self
            .columns
            .get_mut(index)
            .ok_or(EditorError::ColumnOutOfRange { index, len })?;
        column.schema = schema;
        Ok(())
    }

    /// Truncate to the nearest ancestor whose data still exists
    ///
    /// Returns the path of the first stale column, if one was found.
    pub fn repair(&mut self, tree: &EntityTree) -> Option<DataPath> {
        let stale = self
            .columns
            .iter()
            .position(|column| !tree.contains(column.path()))?;
        let path = self.columns[stale].path().clone();
        self.columns.truncate(stale);
        Some(path)
    }
}
