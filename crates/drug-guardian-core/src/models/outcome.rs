//! Prediction outcomes and the display data derived from them.

use std::fmt;

use drug_guardian_predict::PredictionResult;
use serde::{Deserialize, Serialize};

/// Settled result of one prediction request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Success { text: String },
    Failure { message: String },
}

impl PredictionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success { .. })
    }

    /// Prediction text, if this is a success.
    pub fn text(&self) -> Option<&str> {
        match self {
            PredictionOutcome::Success { text } => Some(text),
            PredictionOutcome::Failure { .. } => None,
        }
    }
}

impl From<PredictionResult<String>> for PredictionOutcome {
    fn from(result: PredictionResult<String>) -> Self {
        match result {
            Ok(text) => PredictionOutcome::Success { text },
            Err(e) => PredictionOutcome::Failure {
                message: e.user_message(),
            },
        }
    }
}

/// Interaction severity detected in prediction text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::High => "high",
            SeverityLevel::Medium => "medium",
            SeverityLevel::Low => "low",
            SeverityLevel::Unknown => "unknown",
        }
    }

    /// Badge text for the results header.
    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::High => "High Risk",
            SeverityLevel::Medium => "Medium Risk",
            SeverityLevel::Low => "Low Risk",
            SeverityLevel::Unknown => "Analysis Complete",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One block of formatted prediction text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplaySegment {
    /// Section title with optional body text (body may be empty)
    Heading { title: String, body: String },
    Bullet { text: String },
    Paragraph { text: String },
}
