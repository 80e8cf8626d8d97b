//! User-facing toast notifications queued by the orchestrator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub(crate) fn insufficient_drugs() -> Self {
        Self::error(
            "Insufficient drugs",
            "Please select at least 2 drugs for interaction analysis.",
        )
    }

    pub(crate) fn analysis_complete() -> Self {
        Self::success(
            "Analysis complete",
            "Side effect prediction generated successfully.",
        )
    }

    pub(crate) fn analysis_failed(message: &str) -> Self {
        Self::error("Analysis failed", message)
    }
}
