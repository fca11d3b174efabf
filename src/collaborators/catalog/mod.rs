//! Catalog backends: SQLite file and in-memory. Selected once from [`CatalogSettings`].

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ports::CatalogStore;
use crate::types::{CatalogId, CatalogRecord};
use crate::utils::settings::{CatalogBackend, CatalogSettings};

/// A stored record with its id and last update time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub record: CatalogRecord,
    pub updated_at: i64,
}

/// Aggregate counts for `--stats`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: u64,
    pub published: u64,
    /// Category slug -> record count.
    pub by_category: BTreeMap<String, u64>,
    pub total_size: u64,
}

/// Open the configured backend.
pub fn open_catalog(settings: &CatalogSettings) -> Result<Arc<dyn CatalogStore>> {
    Ok(match settings.backend {
        CatalogBackend::Sqlite => Arc::new(SqliteCatalog::open(&settings.path)?),
        CatalogBackend::Memory => Arc::new(MemoryCatalog::new()),
    })
}
