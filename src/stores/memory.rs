//! In-process record store.

use super::RecordStore;
use crate::error::StoreError;
use crate::models::Record;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Records held as JSON text in a map keyed by record id.
///
/// Values are kept as encoded text, the same bytes a remote store would
/// hold, so reading a record back goes through a real decode.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the record stored under `id`.
    pub fn get(&self, id: &str) -> Result<Option<Value>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records
            .get(id)
            .map(|text| serde_json::from_str::<Value>(text))
            .transpose()
            .map_err(StoreError::from)
    }

    /// All stored ids, sorted.
    pub fn ids(&self) -> Result<Vec<String>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let mut ids: Vec<String> = records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl RecordStore for MemoryStore {
    #[instrument(level = "debug", skip_all, fields(id = %record.id()))]
    async fn put(&self, record: &Record) -> Result<(), StoreError> {
        if record.id().is_empty() {
            return Err(StoreError::Rejected {
                id: String::new(),
                reason: "empty key".to_string(),
            });
        }
        let text = serde_json::to_string(record)?;
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let replaced = records.insert(record.id().to_string(), text).is_some();
        debug!(replaced, "Stored record in memory");
        Ok(())
    }
}
