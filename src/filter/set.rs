use super::error::ValidationError;
use super::model::{FactorType, FilterEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered filter bar state
///
/// Entry order defines the left-to-right combination order, so every
/// editing operation preserves the relative order of the remaining entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    /// Create a new empty filter set
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, duplicates included
    pub fn push(&mut self, entry: FilterEntry) {
        self.entries.push(entry);
    }

    /// Append an entry unless one with the same key is already present
    ///
    /// Returns `true` if the entry was added.
    pub fn insert_unique(&mut self, entry: FilterEntry) -> bool {
        if self.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Remove the entry at `index`, if any
    pub fn remove(&mut self, index: usize) -> Option<FilterEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Remove every entry matching the predicate
    pub fn remove_where<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&FilterEntry) -> bool,
    {
        self.entries.retain(|e| !predicate(e));
    }

    pub fn remove_by_factor(&mut self, factor: FactorType) {
        self.remove_where(|e| e.factor == factor);
    }

    pub fn by_factor(&self, factor: FactorType) -> Vec<&FilterEntry> {
        self.entries.iter().filter(|e| e.factor == factor).collect()
    }

    /// Check whether an entry with the same key is present
    pub fn contains(&self, entry: &FilterEntry) -> bool {
        let key = entry.key();
        self.entries.iter().any(|e| e.key() == key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop later duplicates, keeping the first occurrence of every key
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.entries.retain(|e| seen.insert(e.key()));
    }

    /// Validate every entry, returning the failures with their positions
    pub fn validation_errors(&self) -> Vec<(usize, ValidationError)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| e.validate().err().map(|err| (idx, err)))
            .collect()
    }

    /// Split into the valid entries and the errors of the dropped ones
    ///
    /// Error indices refer to positions in the original set.
    pub fn partition_valid(self) -> (FilterSet, Vec<(usize, ValidationError)>) {
        let mut valid = Vec::with_capacity(self.entries.len());
        let mut errors = Vec::new();
        for (idx, entry) in self.entries.into_iter().enumerate() {
            match entry.validate() {
                Ok(()) => valid.push(entry),
                Err(err) => errors.push((idx, err)),
            }
        }
        (FilterSet { entries: valid }, errors)
    }
}

impl From<Vec<FilterEntry>> for FilterSet {
    fn from(entries: Vec<FilterEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<FilterEntry> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FilterSet {
    type Item = FilterEntry;
    type IntoIter = std::vec::IntoIter<FilterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a FilterEntry;
    type IntoIter = std::slice::Iter<'a, FilterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::model::Relation;

    fn tag(value: &str) -> FilterEntry {
        FilterEntry::new(FactorType::Tag, "CONTAIN", value)
    }

    #[test]
    fn test_insert_unique_ignores_relation() {
        let mut set = FilterSet::new();
        assert!(set.insert_unique(tag("work")));
        assert!(!set.insert_unique(tag("work").with_relation(Relation::Or)));
        assert!(set.insert_unique(tag("home")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_by_factor_keeps_order() {
        let mut set = FilterSet::from(vec![
            tag("a"),
            FilterEntry::new(FactorType::Text, "CONTAIN", "x"),
            tag("b"),
        ]);
        set.remove_by_factor(FactorType::Text);
        let values: Vec<_> = set.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut set = FilterSet::from(vec![tag("a")]);
        assert_eq!(set.remove(3), None);
        assert_eq!(set.remove(0), Some(tag("a")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut set = FilterSet::from(vec![
            tag("a").with_relation(Relation::Or),
            tag("b"),
            tag("a"),
        ]);
        set.dedup();
        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[0].relation, Relation::Or);
    }

    #[test]
    fn test_partition_valid_reports_original_indices() {
        let set = FilterSet::from(vec![
            tag("a"),
            FilterEntry::new(FactorType::Type, "CONTAIN", "x"),
            FilterEntry::new(FactorType::Visibility, "IS", "PUBLIC"),
        ]);
        let (valid, errors) = set.partition_valid();
        assert_eq!(valid.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, 1);
    }
}
