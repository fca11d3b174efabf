use std::sync::Mutex;

use crate::error::PortError;
use crate::ports::{CatalogStore, Collaborator};
use crate::types::{CatalogId, CatalogRecord};

/// Records kept in process memory; ids start at 1.
#[derive(Default)]
pub struct MemoryCatalog {
    rows: Mutex<Vec<CatalogRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, in insertion order.
    pub fn records(&self) -> Vec<CatalogRecord> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Collaborator for MemoryCatalog {
    fn name(&self) -> &str {
        "memory-catalog"
    }
}

impl CatalogStore for MemoryCatalog {
    fn create(&self, record: &CatalogRecord) -> Result<CatalogId, PortError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| PortError::Persistence("catalog lock poisoned".to_string()))?;
        rows.push(record.clone());
        Ok(rows.len() as CatalogId)
    }
}
