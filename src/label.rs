//! Label registry: stable label-name ↔ dense-index bijection.
//!
//! Contingency-table shape depends on the full label set, so registration
//! and lookup are split into two phases. A [`LabelRegistryBuilder`]
//! observes names while the records are scanned; [`LabelRegistryBuilder::freeze`]
//! then produces an immutable [`LabelRegistry`] that the matrix builders
//! and the decomposer read from. Nothing can register a label after the
//! freeze, so decomposition never races a growing registry.
//!
//! Multi-label runs register *combination strings*: the sorted,
//! comma-joined indices of the labels a bipartition selected, with
//! [`EMPTY_COMBINATION`] standing in when nothing reached the threshold.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel combination name used when a bipartition selects no label.
///
/// It is registered lazily, exactly once per run, the first time either
/// side of a record selects nothing.
pub const EMPTY_COMBINATION: &str = "";

/// Canonical combination string for a set of selected label indices:
/// ascending order, comma-joined. An empty selection yields
/// [`EMPTY_COMBINATION`].
#[must_use]
pub fn combination_name(indices: &[usize]) -> String {
    if indices.is_empty() {
        return EMPTY_COMBINATION.to_string();
    }
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Whether a combination string contains a given label index.
///
/// [`EMPTY_COMBINATION`] contains no label.
#[must_use]
pub fn combination_contains(combination: &str, label: usize) -> bool {
    if combination.is_empty() {
        return false;
    }
    combination
        .split(',')
        .any(|member| member.parse::<usize>() == Ok(label))
}

/// Mutable registration phase of the label registry.
///
/// Observation order decides index assignment: the first distinct name
/// observed gets index 0, the next gets 1, and so on. Callers scan gold
/// before predicted within each record so indices are reproducible for a
/// given record sequence.
#[derive(Debug, Default, Clone)]
pub struct LabelRegistryBuilder {
    index: HashMap<String, usize>,
    names: Vec<String>,
}

impl LabelRegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` if unseen and return its index.
    pub fn observe(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.index.insert(name.to_string(), idx);
        self.names.push(name.to_string());
        idx
    }

    /// Number of distinct names observed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// End the registration phase.
    #[must_use]
    pub fn freeze(self) -> LabelRegistry {
        LabelRegistry {
            index: self.index,
            names: self.names,
        }
    }
}

/// Immutable label-name ↔ index bijection.
///
/// Produced by [`LabelRegistryBuilder::freeze`]; the only form the matrix
/// builders and the decomposer accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRegistry {
    index: HashMap<String, usize>,
    names: Vec<String>,
}

impl LabelRegistry {
    /// Index assigned to `name`, if registered.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name registered at `index`.
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registered names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_assigns_dense_indices() {
        let mut builder = LabelRegistryBuilder::new();
        assert_eq!(builder.observe("b"), 0);
        assert_eq!(builder.observe("a"), 1);
        assert_eq!(builder.observe("b"), 0);
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_freeze_round_trip() {
        let mut builder = LabelRegistryBuilder::new();
        builder.observe("0,2");
        builder.observe(EMPTY_COMBINATION);
        let registry = builder.freeze();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of("0,2"), Some(0));
        assert_eq!(registry.index_of(EMPTY_COMBINATION), Some(1));
        assert_eq!(registry.name_of(0), Some("0,2"));
        assert_eq!(registry.name_of(1), Some(""));
        assert_eq!(registry.index_of("missing"), None);
        assert_eq!(registry.name_of(9), None);
    }

    #[test]
    fn test_names_in_index_order() {
        let mut builder = LabelRegistryBuilder::new();
        builder.observe("z");
        builder.observe("a");
        builder.observe("m");
        let registry = builder.freeze();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_combination_name_sorts_and_joins() {
        assert_eq!(combination_name(&[2, 0, 1]), "0,1,2");
        assert_eq!(combination_name(&[5]), "5");
        assert_eq!(combination_name(&[]), EMPTY_COMBINATION);
    }

    #[test]
    fn test_combination_contains() {
        assert!(combination_contains("0,2,11", 2));
        assert!(combination_contains("0,2,11", 11));
        // "11" must not match label 1
        assert!(!combination_contains("0,2,11", 1));
        assert!(!combination_contains(EMPTY_COMBINATION, 0));
    }
}
