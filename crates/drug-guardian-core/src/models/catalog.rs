//! Common drug catalog used for input suggestions.

use super::DrugSet;

/// Frequently prescribed drugs offered as quick picks.
pub const COMMON_DRUGS: &[&str] = &[
    "Aspirin",
    "Metformin",
    "Lisinopril",
    "Atorvastatin",
    "Amlodipine",
    "Omeprazole",
    "Levothyroxine",
    "Metoprolol",
    "Warfarin",
    "Simvastatin",
    "Losartan",
    "Gabapentin",
    "Hydrochlorothiazide",
    "Albuterol",
    "Sertraline",
];

/// Maximum suggestions shown while typing.
pub const MAX_SUGGESTIONS: usize = 5;

/// Maximum quick-add chips shown.
pub const MAX_QUICK_ADD: usize = 8;

/// Catalog entries containing `query` (case-insensitive), skipping selected ones.
///
/// An empty query yields no suggestions.
pub fn suggest(query: &str, selected: &DrugSet) -> Vec<&'static str> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    COMMON_DRUGS
        .iter()
        .copied()
        .filter(|drug| drug.to_lowercase().contains(&needle) && !selected.contains(drug))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// First catalog entries not yet selected.
pub fn quick_add(selected: &DrugSet) -> Vec<&'static str> {
    COMMON_DRUGS
        .iter()
        .copied()
        .filter(|drug| !selected.contains(drug))
        .take(MAX_QUICK_ADD)
        .collect()
}
