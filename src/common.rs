/// Common types and utilities shared across handlers and services
use std::collections::HashSet;

/// Insertion-ordered set of strings used for descriptive rollups.
///
/// The aggregator collects brand names, product descriptions, and item codes
/// across all line items, de-duplicated but in first-seen order, and flattens
/// them to a single delimited string for storage on the order header.
#[derive(Debug, Default, Clone)]
pub struct OrderedSet {
    seen: HashSet<String>,
    values: Vec<String>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` unless it is blank or already present.
    pub fn insert(&mut self, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.seen.insert(trimmed.to_string()) {
            self.values.push(trimmed.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Flattens to a `sep`-delimited string in insertion order.
    pub fn join(&self, sep: &str) -> String {
        self.values.join(sep)
    }
}

impl<S: Into<String>> Extend<S> for OrderedSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for value in iter {
            self.insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_preserving_insertion_order() {
        let mut set = OrderedSet::new();
        set.insert("Tile A");
        set.insert("Tile B");
        set.insert("Tile A");
        set.insert("  Tile B ");
        assert_eq!(set.len(), 2);
        assert_eq!(set.join(", "), "Tile A, Tile B");
    }

    #[test]
    fn ignores_blank_values() {
        let mut set = OrderedSet::new();
        set.insert("");
        set.insert("   ");
        set.insert("X");
        assert_eq!(set.join(","), "X");
    }
}
