//! Storage ports for the history store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{HistoryError, HistoryResult};
use crate::db::Database;

/// Durable key-value storage the history store writes through.
pub trait HistoryPersistence: Send {
    fn read(&self, key: &str) -> HistoryResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> HistoryResult<()>;
    fn clear(&mut self, key: &str) -> HistoryResult<()>;
}

impl HistoryPersistence for Database {
    fn read(&self, key: &str) -> HistoryResult<Option<String>> {
        Ok(self.get_state(key)?)
    }

    fn write(&mut self, key: &str, value: &str) -> HistoryResult<()> {
        Ok(self.put_state(key, value)?)
    }

    fn clear(&mut self, key: &str) -> HistoryResult<()> {
        self.delete_state(key)?;
        Ok(())
    }
}

/// Process-local storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, for inspection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().ok().and_then(|map| map.get(key).cloned())
    }

    fn map(&self) -> HistoryResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.inner
            .lock()
            .map_err(|e| HistoryError::Storage(format!("Lock poisoned: {}", e)))
    }
}

impl HistoryPersistence for MemoryPersistence {
    fn read(&self, key: &str) -> HistoryResult<Option<String>> {
        Ok(self.map()?.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> HistoryResult<()> {
        self.map()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> HistoryResult<()> {
        self.map()?.remove(key);
        Ok(())
    }
}
