//! Order-preserving, duplicate-free advice list.

use serde::{Deserialize, Serialize};

/// Advice strings in first-inserted order. Re-inserting an entry is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdviceList(Vec<String>);

impl AdviceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, entry: &str) -> bool {
        if self.contains(entry) {
            return false;
        }
        self.0.push(entry.to_string());
        true
    }

    pub fn extend_from(&mut self, entries: &[&str]) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.iter().any(|existing| existing == entry)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> FromIterator<&'a str> for AdviceList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = Self::new();
        for entry in iter {
            list.insert(entry);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_seen_order() {
        let mut list = AdviceList::new();
        assert!(list.insert("umbrella"));
        assert!(list.insert("tissues"));
        assert!(!list.insert("umbrella"));
        assert!(list.insert("gloves"));

        let entries: Vec<&str> = list.iter().collect();
        assert_eq!(entries, vec!["umbrella", "tissues", "gloves"]);
    }

    #[test]
    fn test_extend_from_dedups() {
        let mut list = AdviceList::new();
        list.extend_from(&["a", "b"]);
        list.extend_from(&["b", "c", "a"]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn test_collect() {
        let list: AdviceList = ["x", "y", "x"].into_iter().collect();
        assert_eq!(list.len(), 2);
        assert!(list.contains("y"));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let list: AdviceList = ["x", "y"].into_iter().collect();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["x","y"]"#);
    }
}
