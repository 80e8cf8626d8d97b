//! The user's working set of drugs.

use serde::{Deserialize, Serialize};

/// Ordered collection of distinct, trimmed, non-empty drug names.
///
/// Duplicates are detected by exact (case-sensitive) comparison after
/// trimming. Serializes as a plain JSON array; deserialization goes through
/// [`DrugSet::add`] so the invariants hold for stored data too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DrugSet {
    names: Vec<String>,
}

impl DrugSet {
    /// Minimum number of drugs before a prediction may be requested.
    pub const MIN_FOR_ANALYSIS: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` after trimming. Returns false if blank or already present.
    pub fn add(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.names.push(trimmed.to_string());
        true
    }

    /// Remove an exact match. Returns false if nothing was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether enough drugs are selected to request a prediction.
    pub fn is_ready(&self) -> bool {
        self.names.len() >= Self::MIN_FOR_ANALYSIS
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.clone()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DrugSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = DrugSet::new();
        for name in iter {
            set.add(name.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for DrugSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<DrugSet> for Vec<String> {
    fn from(set: DrugSet) -> Self {
        set.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_trims_and_dedupes() {
        let mut set = DrugSet::new();
        assert!(set.add("  Aspirin "));
        assert!(!set.add("Aspirin"));
        assert!(set.add("aspirin")); // case-sensitive
        assert_eq!(set.as_slice(), &["Aspirin".to_string(), "aspirin".to_string()]);
    }

    #[test]
    fn test_add_blank_is_noop() {
        let mut set = DrugSet::new();
        assert!(!set.add(""));
        assert!(!set.add("   \t"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut set: DrugSet = ["Aspirin", "Warfarin", "Metformin"].into_iter().collect();
        assert!(set.remove("Warfarin"));
        assert!(!set.remove("Warfarin"));
        assert!(!set.remove("metformin"));
        assert_eq!(set.to_vec(), vec!["Aspirin", "Metformin"]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let set: DrugSet = ["Warfarin", "Aspirin", "Metformin"].into_iter().collect();
        let names: Vec<&str> = set.iter().collect();
        assert_eq!(names, vec!["Warfarin", "Aspirin", "Metformin"]);
    }

    #[test]
    fn test_is_ready() {
        let mut set = DrugSet::new();
        assert!(!set.is_ready());
        set.add("Aspirin");
        assert!(!set.is_ready());
        set.add("Warfarin");
        assert!(set.is_ready());
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let set: DrugSet = serde_json::from_str(r#"["Aspirin", " Aspirin ", "", "Warfarin"]"#).unwrap();
        assert_eq!(set.to_vec(), vec!["Aspirin", "Warfarin"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["Aspirin","Warfarin"]"#);
    }

    proptest! {
        #[test]
        fn prop_add_is_idempotent(name in "\\PC*") {
            let mut set = DrugSet::new();
            set.add(&name);
            set.add(&name);
            let expected = if name.trim().is_empty() { 0 } else { 1 };
            prop_assert_eq!(set.len(), expected);
        }

        #[test]
        fn prop_no_duplicates(names in proptest::collection::vec("[a-c ]{0,4}", 0..20)) {
            let set: DrugSet = names.iter().collect();
            let mut seen = std::collections::HashSet::new();
            for name in set.iter() {
                prop_assert!(!name.is_empty());
                prop_assert_eq!(name, name.trim());
                prop_assert!(seen.insert(name.to_string()));
            }
        }
    }
}
