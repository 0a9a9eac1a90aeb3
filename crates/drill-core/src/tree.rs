//! Entity data tree
//!
//! The single owned copy of the entity being edited, addressed by
//! [`DataPath`]. Columns never copy data out of it; they read and write
//! through their path.

use crate::error::{EditorError, EditorResult};
use drill_schema::{DataPath, Segment};
use serde_json::{Map, Value};

/// Owned entity data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityTree {
    root: Value,
}

impl EntityTree {
    /// Wrap a root value
    #[inline]
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Root value
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Take the root value out
    #[inline]
    #[must_use]
    pub fn into_root(self) -> Value {
        self.root
    }

    /// Get value at path
    #[must_use]
    pub fn get(&self, path: &DataPath) -> Option<&Value> {
        path.iter().try_fold(&self.root, |current, segment| step(current, segment))
    }

    /// Get mutable value at path
    pub fn get_mut(&mut self, path: &DataPath) -> Option<&mut Value> {
        path.iter()
            .try_fold(&mut self.root, |current, segment| step_mut(current, segment))
    }

    /// Check if path exists
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &DataPath) -> bool {
        self.get(path).is_some()
    }

    /// Set value at path, returning the value it replaced
    ///
    /// Missing intermediate object keys are created as `{}` when the next
    /// segment is a key. Array indices must already exist.
    ///
    /// # Errors
    /// Returns `EditorError::PathNotFound` if a parent is missing or has the
    /// wrong container type, or an index is out of range
    pub fn set(&mut self, path: &DataPath, value: Value) -> EditorResult<Option<Value>> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Ok(Some(std::mem::replace(&mut self.root, value)));
        };

        let not_found = || EditorError::PathNotFound(path.clone());
        let mut current = &mut self.root;
        for (position, segment) in parents.iter().enumerate() {
            let next_is_key = matches!(
                path.get(position + 1),
                Some(Segment::Key(_))
            );
            current = match (current, segment) {
                (Value::Object(map), Segment::Key(key)) => {
                    if !map.contains_key(key) && !next_is_key {
                        return Err(not_found());
                    }
                    map.entry(key.clone())
                        .or_insert_with(|| Value::Object(Map::new()))
                }
                (Value::Array(items), Segment::Index(index)) => {
                    items.get_mut(*index).ok_or_else(not_found)?
                }
                _ => return Err(not_found()),
            };
        }

        match (current, last) {
            (Value::Object(map), Segment::Key(key)) => Ok(map.insert(key.clone(), value)),
            (Value::Array(items), Segment::Index(index)) => {
                let slot = items.get_mut(*index).ok_or_else(not_found)?;
                Ok(Some(std::mem::replace(slot, value)))
            }
            _ => Err(not_found()),
        }
    }

    /// Get mutable array at path
    ///
    /// # Errors
    /// - `EditorError::PathNotFound` if nothing is at `path`
    /// - `EditorError::InvalidOperation` if the value there is not an array
    pub fn array_mut(&mut self, path: &DataPath) -> EditorResult<&mut Vec<Value>> {
        match self.get_mut(path) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(EditorError::invalid_operation(path, "value is not an array")),
            None => Err(EditorError::PathNotFound(path.clone())),
        }
    }

    /// Length of the array at path, if there is one
    #[must_use]
    pub fn array_len(&self, path: &DataPath) -> Option<usize> {
        self.get(path).and_then(Value::as_array).map(Vec::len)
    }
}

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn step_mut<'a>(current: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get_mut(key),
        (Value::Array(items), Segment::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}
