//! Search history models.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::DrugSet;

/// A past successful submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// Drugs submitted, in submission order
    pub drugs: DrugSet,
    /// ISO-8601 UTC instant of the successful prediction
    pub timestamp: String,
    /// Unique opaque token
    pub id: String,
}

impl HistoryEntry {
    /// Snapshot `drugs` with a fresh id and the current time.
    pub fn new(drugs: DrugSet) -> Self {
        Self {
            drugs,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}
