//! Keyword-based severity classification.

use crate::models::SeverityLevel;

/// Keyword groups in precedence order; the first group with a hit wins.
const SEVERITY_KEYWORDS: &[(SeverityLevel, &[&str])] = &[
    (SeverityLevel::High, &["high risk", "severe"]),
    (SeverityLevel::Medium, &["medium risk", "moderate"]),
    (SeverityLevel::Low, &["low risk", "minimal"]),
];

/// Classify prediction text by case-insensitive keyword matching.
pub fn classify_severity(text: &str) -> SeverityLevel {
    let lower = text.to_lowercase();
    SEVERITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(level, _)| *level)
        .unwrap_or(SeverityLevel::Unknown)
}
