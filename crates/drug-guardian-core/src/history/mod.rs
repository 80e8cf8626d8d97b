//! Bounded, persisted search history.
//!
//! The store keeps the list in memory and writes the whole list through its
//! [`HistoryPersistence`] port on every mutation. A mutation only becomes
//! visible in memory once the write succeeded.

mod persistence;

pub use persistence::*;

use thiserror::Error;
use tracing::{debug, warn};

use crate::db::DbError;
use crate::models::{DrugSet, HistoryEntry};

/// Fixed storage key for the serialized history list.
pub const HISTORY_KEY: &str = "drug-guardian.search-history";

/// Maximum retained entries.
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// Entries shown in the "recent searches" panel.
pub const RECENT_DISPLAY_COUNT: usize = 5;

/// History errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Most-recent-first list of past successful submissions.
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    persistence: Box<dyn HistoryPersistence>,
}

impl HistoryStore {
    /// Load the persisted list. A missing key yields an empty history.
    ///
    /// Unreadable stored JSON is logged and treated as empty; it is replaced
    /// on the next successful write.
    pub fn load(persistence: Box<dyn HistoryPersistence>) -> HistoryResult<Self> {
        let entries = match persistence.read(HISTORY_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(MAX_HISTORY_ENTRIES);
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "discarding unreadable search history");
                    Vec::new()
                }
            },
        };
        debug!(count = entries.len(), "search history loaded");

        Ok(Self {
            entries,
            persistence,
        })
    }

    /// Empty store backed by process memory.
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            persistence: Box::new(MemoryPersistence::new()),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The `n` most recent entries.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend a new entry for `drugs`, evicting the oldest beyond the bound.
    pub fn record(&mut self, drugs: DrugSet) -> HistoryResult<HistoryEntry> {
        let entry = HistoryEntry::new(drugs);

        let mut next = Vec::with_capacity(MAX_HISTORY_ENTRIES);
        next.push(entry.clone());
        next.extend(
            self.entries
                .iter()
                .take(MAX_HISTORY_ENTRIES - 1)
                .cloned(),
        );

        self.persist(&next)?;
        self.entries = next;
        debug!(id = %entry.id, count = self.entries.len(), "history entry recorded");
        Ok(entry)
    }

    /// Remove every entry and the persisted key.
    pub fn clear(&mut self) -> HistoryResult<()> {
        self.persistence.clear(HISTORY_KEY)?;
        self.entries.clear();
        debug!("search history cleared");
        Ok(())
    }

    fn persist(&mut self, entries: &[HistoryEntry]) -> HistoryResult<()> {
        let json = serde_json::to_string(entries)?;
        self.persistence.write(HISTORY_KEY, &json)
    }
}
