//! Entity editor
//!
//! [`EntityEditor`] owns the open entity and coordinates every mutation:
//! - Resolves the effective schema at a path (awaiting named lookups)
//! - Synthesizes defaults for new items and missing containers
//! - Keeps the column stack and validation keys aligned with the data
//!
//! Each operation does all of its awaiting first and mutates last, in one
//! synchronous step. Dropping a pending future therefore leaves the editor
//! exactly as it was.

use crate::column::{Column, ColumnSchema, ColumnStack};
use crate::config::{EditorConfig, NavigationPolicy};
use crate::error::{EditorError, EditorResult};
use crate::tree::EntityTree;
use crate::validation::ValidationAggregator;
use drill_schema::{
    synthesize, Child, DataPath, EffectiveSchema, Schema, SchemaDiagnostic, SchemaRegistry,
    SchemaResolver, Segment, Shape,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use ulid::Ulid;

/// Array element as presented to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayItem {
    /// Position within the array
    pub index: usize,
    /// Element data
    pub data: Value,
    /// Still being staged (schema and default not yet committed)
    pub is_temporary: bool,
}

/// New array element whose schema and default are computed but which is
/// not yet part of the entity
///
/// Produced by [`EntityEditor::stage_array_item`], consumed by
/// [`EntityEditor::commit_array_item`].
#[derive(Debug, Clone)]
pub struct StagedItem {
    entity: Ulid,
    array_path: DataPath,
    index: usize,
    data: Value,
    item_schema: Arc<EffectiveSchema>,
    array_schema: Option<Arc<EffectiveSchema>>,
}

impl StagedItem {
    /// Path of the target array
    #[inline]
    #[must_use]
    pub fn array_path(&self) -> &DataPath {
        &self.array_path
    }

    /// Index the item will occupy once committed
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Synthesized default data
    #[inline]
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Effective schema of the item
    #[inline]
    #[must_use]
    pub fn item_schema(&self) -> &Arc<EffectiveSchema> {
        &self.item_schema
    }

    /// Temporary record for rendering while staged
    #[must_use]
    pub fn record(&self) -> ArrayItem {
        ArrayItem {
            index: self.index,
            data: self.data.clone(),
            is_temporary: true,
        }
    }
}

/// Result of a successful navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Index of the newly opened column
    pub column: usize,
    /// Field errors left behind in the scope being left (permissive policy)
    pub outstanding_errors: Vec<DataPath>,
}

impl NavigationOutcome {
    /// Check if navigation left no errors behind
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.outstanding_errors.is_empty()
    }
}

/// State that exists only while an entity is open
#[derive(Debug)]
struct OpenEntity {
    id: Ulid,
    tree: EntityTree,
    columns: ColumnStack,
    validation: ValidationAggregator,
}

/// Drill-down editor for one entity at a time
#[derive(Debug)]
pub struct EntityEditor {
    /// Configuration
    config: EditorConfig,
    /// Schema resolution over the session cache
    resolver: SchemaResolver,
    /// Open entity, if any
    session: Option<OpenEntity>,
}

impl EntityEditor {
    /// Create editor over a resolver with default configuration
    #[inline]
    #[must_use]
    pub fn new(resolver: SchemaResolver) -> Self {
        Self {
            config: EditorConfig::default(),
            resolver,
            session: None,
        }
    }

    /// Create editor with a fresh schema session over `registry`
    #[must_use]
    pub fn with_config(registry: Arc<dyn SchemaRegistry>, config: EditorConfig) -> Self {
        let resolver = SchemaResolver::new(config.schema_cache(registry))
            .with_max_reference_depth(config.max_reference_depth);
        Self {
            config,
            resolver,
            session: None,
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Schema resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Identifier of the open entity session
    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> Option<Ulid> {
        self.session.as_ref().map(|session| session.id)
    }

    /// Check if an entity is open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open an entity, replacing any entity already open
    ///
    /// A root schema that fails to resolve opens as a placeholder column.
    /// `null` root data is replaced by the synthesized default.
    ///
    /// # Errors
    /// Returns `EditorError::InvalidOperation` if the root schema is an
    /// object or array and `root_data` is a different kind of value.
    /// An untyped root accepts any data as an opaque leaf.
    pub async fn open_entity(
        &mut self,
        root_schema: &Schema,
        root_data: Value,
    ) -> EditorResult<Ulid> {
        let root = match self.resolver.resolve(root_schema).await {
            Ok(effective) => ColumnSchema::Resolved(Arc::new(effective)),
            Err(err) => {
                tracing::warn!("Root schema unresolved, opening placeholder: {}", err);
                ColumnSchema::Placeholder(err.diagnostic())
            }
        };

        let data = match (&root, root_data) {
            (ColumnSchema::Resolved(schema), Value::Null) => synthesize(schema),
            (ColumnSchema::Resolved(schema), data) => {
                let fits = match data {
                    _ if schema.shape == Shape::Unknown => true,
                    Value::Object(_) => schema.properties().is_some(),
                    Value::Array(_) => schema.is_array(),
                    _ => !schema.is_navigable(),
                };
                if !fits {
                    return Err(EditorError::invalid_operation(
                        &DataPath::root(),
                        format!("root data does not match {} schema", schema.type_name()),
                    ));
                }
                data
            }
            (ColumnSchema::Placeholder(_), data) => data,
        };

        if let Some(previous) = self.session.take() {
            tracing::info!("Closing entity {} to open another", previous.id);
        }

        let mut columns = ColumnStack::new();
        columns.open(root);
        let id = Ulid::new();
        self.session = Some(OpenEntity {
            id,
            tree: EntityTree::new(data),
            columns,
            validation: ValidationAggregator::new(),
        });

        tracing::info!("Opened entity {}", id);
        Ok(id)
    }

    /// Close the open entity, returning its data
    pub fn close_entity(&mut self) -> Option<Value> {
        let session = self.session.take()?;
        tracing::info!("Closed entity {}", session.id);
        Some(session.tree.into_root())
    }

    /// Consume the editor, handing the entity data off for persistence
    #[must_use]
    pub fn into_data(self) -> Option<Value> {
        self.session.map(|session| session.tree.into_root())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Open the child `segment` of column `column_index` as the next column
    ///
    /// Columns after `column_index` are replaced. Field errors beneath the
    /// replaced column `column_index + 1` are handled per
    /// [`NavigationPolicy`]; extending the last column leaves nothing behind.
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::ColumnOutOfRange` for an unknown column
    /// - `EditorError::InvalidOperation` if the column is terminal or does
    ///   not declare `segment`
    /// - `EditorError::PathNotFound` for an array index past the end
    /// - `EditorError::NavigationBlocked` under the strict policy
    pub async fn navigate(
        &mut self,
        column_index: usize,
        segment: impl Into<Segment>,
    ) -> EditorResult<NavigationOutcome> {
        let segment = segment.into();

        // 1. Check the request against the current state
        let (outstanding, slot, parent) = {
            let session = self.open()?;
            let column = session.columns.column(column_index)?;
            let slot = child_slot(column, &segment, &session.tree)?;
            let destination = column.path().child(segment.clone());

            // Only the column being replaced is left; extending the frontier leaves nothing
            let scope = session.columns.get(column_index + 1).map(Column::path);
            let outstanding: Vec<DataPath> = scope
                .map(|scope| {
                    session
                        .validation
                        .errors_under(scope)
                        .filter(|(path, _)| !destination.is_prefix_of(path))
                        .map(|(path, _)| path.clone())
                        .collect()
                })
                .unwrap_or_default();

            if let Some(scope) = scope {
                if !outstanding.is_empty()
                    && self.config.navigation_policy == NavigationPolicy::Strict
                {
                    return Err(EditorError::NavigationBlocked {
                        from: scope.clone(),
                        errors: outstanding,
                    });
                }
            }

            (outstanding, slot, column.effective().cloned())
        };

        // 2. Resolve the child schema; nothing has been touched yet
        let was_deferred = slot.is_deferred();
        let settled = self.resolver.settle(&slot).await;
        let child = column_schema(settled.clone());

        // 3. Apply in one step
        let session = self.open_mut()?;
        let destination = session.columns.column(column_index)?.path().child(segment.clone());

        let fill = match (&child, session.tree.get(&destination)) {
            (ColumnSchema::Resolved(schema), None) => Some(synthesize(schema)),
            (ColumnSchema::Resolved(schema), Some(Value::Null)) if schema.is_navigable() => {
                Some(synthesize(schema))
            }
            (ColumnSchema::Placeholder(_), None) => Some(Value::Null),
            _ => None,
        };
        if let Some(value) = fill {
            session.tree.set(&destination, value)?;
            tracing::debug!("Materialized default at {}", destination);
        }

        if was_deferred {
            let upgraded = parent.and_then(|parent| match &segment {
                Segment::Key(key) => parent.with_property(key, settled),
                Segment::Index(_) => parent.with_items(settled),
            });
            if let Some(upgraded) = upgraded {
                session
                    .columns
                    .replace_schema(column_index, ColumnSchema::Resolved(Arc::new(upgraded)))?;
            }
        }

        if let ColumnSchema::Placeholder(diagnostic) = &child {
            tracing::warn!("Opening placeholder column at {}: {}", destination, diagnostic);
        }
        let column = session.columns.extend_from(column_index, segment, child)?;

        if !outstanding.is_empty() {
            tracing::warn!(
                "Navigated to {} with {} unresolved field error(s) behind",
                destination,
                outstanding.len()
            );
        }
        tracing::debug!("Navigated to {} (column {})", destination, column);

        Ok(NavigationOutcome {
            column,
            outstanding_errors: outstanding,
        })
    }

    /// Drop every column after `column_index`
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::ColumnOutOfRange` for an unknown column
    pub fn truncate_after(&mut self, column_index: usize) -> EditorResult<()> {
        self.open_mut()?.columns.truncate_after(column_index)
    }

    // ------------------------------------------------------------------
    // Data mutation
    // ------------------------------------------------------------------

    /// Write `value` at `path`, returning the value it replaced
    ///
    /// Does not validate. Field errors strictly beneath `path` are dropped
    /// and columns whose data disappeared are truncated.
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::PathNotFound` if the parent container is missing
    pub fn set_value(&mut self, path: &DataPath, value: Value) -> EditorResult<Option<Value>> {
        let session = self.open_mut()?;
        let previous = session.tree.set(path, value)?;

        let dropped = session.validation.remove_subtree(path);
        if dropped > 0 {
            tracing::debug!("Dropped {} field error(s) beneath {}", dropped, path);
        }
        if let Some(stale) = session.columns.repair(&session.tree) {
            tracing::debug!("Truncated columns from {} after replacing {}", stale, path);
        }
        Ok(previous)
    }

    /// Replace the value at `path` with the default of its effective schema
    ///
    /// Used when a reference target or variant changes and the subtree must
    /// be rebuilt from the schema.
    ///
    /// # Errors
    /// Same as [`EntityEditor::set_value`], plus `EditorError::InvalidOperation`
    /// if no schema is available at `path`
    pub async fn reset_value(&mut self, path: &DataPath) -> EditorResult<Value> {
        let schema = self.schema_at(path).await?;
        let value = synthesize(&schema);
        self.set_value(path, value.clone())?;
        Ok(value)
    }

    /// Append a default item to the array at `array_path`
    ///
    /// Returns the new index. The item is fully built before it is appended,
    /// so navigating into it never waits on a lookup.
    ///
    /// # Errors
    /// See [`EntityEditor::stage_array_item`] and
    /// [`EntityEditor::commit_array_item`]
    pub async fn add_array_item(&mut self, array_path: &DataPath) -> EditorResult<usize> {
        let staged = self.stage_array_item(array_path).await?;
        let item = self.commit_array_item(staged)?;
        Ok(item.index)
    }

    /// Resolve the item schema and default for a new element of `array_path`
    ///
    /// Nothing is mutated; the returned item is temporary until committed.
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::InvalidOperation` if the schema at `array_path` is not
    ///   an array, its item schema is unavailable, or the data is not an array
    /// - `EditorError::Schema` if a deferred item reference fails to resolve
    pub async fn stage_array_item(&self, array_path: &DataPath) -> EditorResult<StagedItem> {
        let session = self.open()?;
        let schema = self.schema_at(array_path).await?;
        if !schema.is_array() {
            return Err(EditorError::invalid_operation(
                array_path,
                format!("schema is {}, not array", schema.type_name()),
            ));
        }
        let index = current_len(&session.tree, array_path)?;

        let (item_schema, array_schema) = match schema.items() {
            Some(Child::Resolved(item)) => (Arc::clone(item), None),
            Some(Child::Deferred(item)) => {
                let item = Arc::new(self.resolver.resolve(item).await?);
                let upgraded = schema
                    .with_items(Child::Resolved(Arc::clone(&item)))
                    .map(Arc::new);
                (item, upgraded)
            }
            Some(Child::Unresolved(diagnostic)) => {
                return Err(EditorError::invalid_operation(
                    array_path,
                    format!("item schema unavailable: {diagnostic}"),
                ));
            }
            None => (Arc::new(EffectiveSchema::unknown()), None),
        };

        Ok(StagedItem {
            entity: session.id,
            array_path: array_path.clone(),
            index,
            data: synthesize(&item_schema),
            item_schema,
            array_schema,
        })
    }

    /// Append a staged item to its array
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::StaleStagedItem` if the item was staged for another
    ///   entity or the array changed length since
    pub fn commit_array_item(&mut self, staged: StagedItem) -> EditorResult<ArrayItem> {
        let session = self.open_mut()?;
        if staged.entity != session.id
            || current_len(&session.tree, &staged.array_path)? != staged.index
        {
            return Err(EditorError::StaleStagedItem {
                path: staged.array_path,
            });
        }

        if matches!(session.tree.get(&staged.array_path), None | Some(Value::Null)) {
            session.tree.set(&staged.array_path, Value::Array(Vec::new()))?;
        }
        session
            .tree
            .array_mut(&staged.array_path)?
            .push(staged.data.clone());

        if let (Some(upgraded), Some(column)) = (
            staged.array_schema,
            session.columns.index_of(&staged.array_path),
        ) {
            session
                .columns
                .replace_schema(column, ColumnSchema::Resolved(upgraded))?;
        }

        tracing::debug!("Added item {} to {}", staged.index, staged.array_path);
        Ok(ArrayItem {
            index: staged.index,
            data: staged.data,
            is_temporary: false,
        })
    }

    /// Remove element `index` of the array at `array_path`
    ///
    /// Columns beneath the array are truncated and field errors of later
    /// elements shift down by one.
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::InvalidOperation` if the value is not an array
    /// - `EditorError::PathNotFound` if the array or the index does not exist
    pub fn remove_array_item(&mut self, array_path: &DataPath, index: usize) -> EditorResult<Value> {
        let session = self.open_mut()?;
        let items = session.tree.array_mut(array_path)?;
        if index >= items.len() {
            return Err(EditorError::PathNotFound(array_path.index(index)));
        }
        let removed = items.remove(index);

        session.columns.truncate_descendants(array_path);
        session.validation.reindex_after_removal(array_path, index);
        check_columns(session);

        tracing::debug!("Removed item {} from {}", index, array_path);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Record (or clear, with `None`) the field error at `path`
    ///
    /// # Errors
    /// Returns `EditorError::NoEntityOpen` if no entity is open
    pub fn set_field_error(&mut self, path: DataPath, message: Option<String>) -> EditorResult<()> {
        self.open_mut()?.validation.set_field_error(path, message);
        Ok(())
    }

    /// Drop every field error
    ///
    /// # Errors
    /// Returns `EditorError::NoEntityOpen` if no entity is open
    pub fn clear_all_field_errors(&mut self) -> EditorResult<()> {
        self.open_mut()?.validation.clear_all();
        Ok(())
    }

    /// Check if any field error is outstanding
    #[must_use]
    pub fn has_blocking_errors(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.validation.has_blocking_errors())
    }

    /// Check that the entity may be saved
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::SaveBlocked` while field errors are outstanding
    pub fn ensure_savable(&self) -> EditorResult<()> {
        let session = self.open()?;
        if session.validation.has_blocking_errors() {
            return Err(EditorError::SaveBlocked {
                errors: session.validation.paths(),
            });
        }
        Ok(())
    }

    /// Field error at exactly `path`
    #[must_use]
    pub fn field_error(&self, path: &DataPath) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|session| session.validation.error_at(path))
    }

    /// All field errors in path order
    #[must_use]
    pub fn field_errors(&self) -> Vec<(&DataPath, &str)> {
        self.session
            .as_ref()
            .map(|session| session.validation.iter().collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Current columns, root first (empty when no entity is open)
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        match &self.session {
            Some(session) => session.columns.columns(),
            None => &[],
        }
    }

    /// Column at index
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::ColumnOutOfRange` for an unknown column
    pub fn column(&self, index: usize) -> EditorResult<&Column> {
        self.open()?.columns.column(index)
    }

    /// Live data of column `index`
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::ColumnOutOfRange` for an unknown column
    /// - `EditorError::StaleColumn` if the column outlived its data
    pub fn column_data(&self, index: usize) -> EditorResult<&Value> {
        let session = self.open()?;
        let column = session.columns.column(index)?;
        column
            .data(&session.tree)
            .ok_or_else(|| EditorError::StaleColumn {
                path: column.path().clone(),
            })
    }

    /// Entity data
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.session.as_ref().map(|session| session.tree.root())
    }

    /// Value at `path`
    #[must_use]
    pub fn value_at(&self, path: &DataPath) -> Option<&Value> {
        self.session
            .as_ref()
            .and_then(|session| session.tree.get(path))
    }

    /// Committed elements of the array at `path`
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::PathNotFound` if nothing is at `path`
    /// - `EditorError::InvalidOperation` if the value is not an array
    pub fn array_items(&self, path: &DataPath) -> EditorResult<Vec<ArrayItem>> {
        match self.open()?.tree.get(path) {
            Some(Value::Array(items)) => Ok(items
                .iter()
                .enumerate()
                .map(|(index, data)| ArrayItem {
                    index,
                    data: data.clone(),
                    is_temporary: false,
                })
                .collect()),
            Some(_) => Err(EditorError::invalid_operation(path, "value is not an array")),
            None => Err(EditorError::PathNotFound(path.clone())),
        }
    }

    /// Effective schema at `path`
    ///
    /// Walks down from the deepest column on the way to `path`, resolving
    /// deferred references as it goes.
    ///
    /// # Errors
    /// - `EditorError::NoEntityOpen` if no entity is open
    /// - `EditorError::InvalidOperation` if the path leaves the schema or
    ///   crosses an unresolved reference
    pub async fn schema_at(&self, path: &DataPath) -> EditorResult<Arc<EffectiveSchema>> {
        let session = self.open()?;
        let start = session
            .columns
            .columns()
            .iter()
            .rev()
            .find(|column| column.path().is_prefix_of(path))
            .ok_or_else(|| EditorError::PathNotFound(path.clone()))?;

        let mut current = match start.schema() {
            ColumnSchema::Resolved(schema) => Arc::clone(schema),
            ColumnSchema::Placeholder(diagnostic) => {
                return Err(EditorError::invalid_operation(
                    start.path(),
                    format!("schema unavailable: {diagnostic}"),
                ));
            }
        };
        let mut walked = start.path().clone();

        for segment in path.segments().iter().skip(start.path().len()) {
            let slot = schema_slot(&current, segment).ok_or_else(|| {
                EditorError::invalid_operation(
                    &walked,
                    format!("{} schema has no child '{segment}'", current.type_name()),
                )
            })?;
            walked = walked.child(segment.clone());

            current = match self.resolver.settle(&slot).await {
                Child::Resolved(schema) => schema,
                Child::Unresolved(diagnostic) => {
                    return Err(EditorError::invalid_operation(
                        &walked,
                        format!("schema unavailable: {diagnostic}"),
                    ));
                }
                Child::Deferred(_) => {
                    return Err(EditorError::invalid_operation(&walked, "schema unavailable"));
                }
            };
        }
        Ok(current)
    }

    fn open(&self) -> EditorResult<&OpenEntity> {
        self.session.as_ref().ok_or(EditorError::NoEntityOpen)
    }

    fn open_mut(&mut self) -> EditorResult<&mut OpenEntity> {
        self.session.as_mut().ok_or(EditorError::NoEntityOpen)
    }
}

/// Schema slot for `segment` beneath `schema`, ignoring data
fn schema_slot(schema: &EffectiveSchema, segment: &Segment) -> Option<Child> {
    match segment {
        Segment::Key(key) => schema.property(key).cloned(),
        Segment::Index(_) if schema.is_array() => Some(
            schema
                .items()
                .cloned()
                .unwrap_or_else(|| Child::Resolved(Arc::new(EffectiveSchema::unknown()))),
        ),
        Segment::Index(_) => None,
    }
}

/// Schema slot for navigating from `column` into `segment`
fn child_slot(column: &Column, segment: &Segment, tree: &EntityTree) -> EditorResult<Child> {
    let Some(schema) = column.effective().filter(|schema| schema.is_navigable()) else {
        return Err(EditorError::invalid_operation(
            column.path(),
            "column has no navigable children",
        ));
    };

    if let Segment::Index(index) = segment {
        if schema.is_array() && *index >= tree.array_len(column.path()).unwrap_or(0) {
            return Err(EditorError::PathNotFound(column.path().index(*index)));
        }
    }

    schema_slot(schema, segment).ok_or_else(|| {
        EditorError::invalid_operation(
            column.path(),
            format!("{} schema does not declare '{segment}'", schema.type_name()),
        )
    })
}

/// Column schema for a settled child slot
fn column_schema(child: Child) -> ColumnSchema {
    match child {
        Child::Resolved(schema) => ColumnSchema::Resolved(schema),
        Child::Unresolved(diagnostic) => ColumnSchema::Placeholder(diagnostic),
        Child::Deferred(schema) => ColumnSchema::Placeholder(SchemaDiagnostic {
            reference: schema.referenced_schema_name.clone(),
            message: "reference was not resolved".to_string(),
        }),
    }
}

/// Length of the array at `path`; absent or `null` counts as empty
fn current_len(tree: &EntityTree, path: &DataPath) -> EditorResult<usize> {
    match tree.get(path) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Array(items)) => Ok(items.len()),
        Some(_) => Err(EditorError::invalid_operation(path, "value is not an array")),
    }
}

/// Post-mutation check; a stale column here is a bug
fn check_columns(session: &mut OpenEntity) {
    if let Some(path) = session.columns.repair(&session.tree) {
        tracing::error!("Repaired column stack: {}", EditorError::StaleColumn { path });
    }
}
