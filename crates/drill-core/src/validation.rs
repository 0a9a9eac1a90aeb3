//! Path-keyed validation state
//!
//! [`ValidationAggregator`] holds at most one message per [`DataPath`].
//! Messages come from external field validators; the editor only stores
//! them, keeps their keys aligned with array removals, and gates saving on
//! them.

use drill_schema::{DataPath, Segment};
use std::collections::BTreeMap;

/// Field error messages keyed by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationAggregator {
    errors: BTreeMap<DataPath, String>,
}

impl ValidationAggregator {
    /// Create empty aggregator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the message at `path`; last write wins
    pub fn set_field_error(&mut self, path: DataPath, message: Option<String>) {
        match message {
            Some(message) => {
                self.errors.insert(path, message);
            }
            None => {
                self.errors.remove(&path);
            }
        }
    }

    /// Drop every message
    #[inline]
    pub fn clear_all(&mut self) {
        self.errors.clear();
    }

    /// Check if any message is outstanding
    #[inline]
    #[must_use]
    pub fn has_blocking_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of outstanding messages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if there are no messages
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message at exactly `path`
    #[inline]
    #[must_use]
    pub fn error_at(&self, path: &DataPath) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// Messages at `prefix` or beneath it, in path order
    pub fn errors_under<'a>(
        &'a self,
        prefix: &'a DataPath,
    ) -> impl Iterator<Item = (&'a DataPath, &'a str)> + 'a {
        self.errors
            .iter()
            .filter(move |(path, _)| prefix.is_prefix_of(path))
            .map(|(path, message)| (path, message.as_str()))
    }

    /// All messages in path order
    pub fn iter(&self) -> impl Iterator<Item = (&DataPath, &str)> {
        self.errors
            .iter()
            .map(|(path, message)| (path, message.as_str()))
    }

    /// Paths of all messages, in path order
    #[must_use]
    pub fn paths(&self) -> Vec<DataPath> {
        self.errors.keys().cloned().collect()
    }

    /// Drop every message strictly beneath `prefix`
    ///
    /// Returns the number of messages dropped.
    pub fn remove_subtree(&mut self, prefix: &DataPath) -> usize {
        let before = self.errors.len();
        self.errors.retain(|path, _| !prefix.is_ancestor_of(path));
        before - self.errors.len()
    }

    /// Re-key messages after `array_path[index]` was removed
    ///
    /// Messages under the removed element are dropped. Messages under a
    /// later element `j` move to `j - 1`. Everything else is untouched.
    pub fn reindex_after_removal(&mut self, array_path: &DataPath, index: usize) {
        let position = array_path.len();
        let errors = std::mem::take(&mut self.errors);

        self.errors = errors
            .into_iter()
            .filter_map(|(path, message)| {
                if !array_path.is_ancestor_of(&path) {
                    return Some((path, message));
                }
                match path.get(position) {
                    Some(Segment::Index(j)) if *j == index => None,
                    Some(Segment::Index(j)) if *j > index => path
                        .with_segment_at(position, Segment::Index(j - 1))
                        .map(|moved| (moved, message)),
                    _ => Some((path, message)),
                }
            })
            .collect();
    }
}
