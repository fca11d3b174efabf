//! Local implementations of every port, usable without remote services.
//!
//! Each reports [`is_configured`](crate::ports::Collaborator::is_configured) `false` when its
//! settings are missing, in which case its port simulates.

pub mod acquirer;
pub mod catalog;
pub mod enricher;
pub mod hosting;
pub mod lister;
pub mod media;
pub mod object_store;

pub use acquirer::LocalAcquirer;
pub use catalog::{
    CatalogEntry, CatalogStats, MemoryCatalog, SqliteCatalog, open_catalog,
};
pub use enricher::SidecarEnricher;
pub use hosting::MirrorPlatform;
pub use lister::DirectoryLister;
pub use media::MediaLibrary;
pub use object_store::DirectoryObjectStore;

use std::path::{Component, Path};

use crate::error::PortError;

/// Error for a collaborator whose settings are missing.
pub(crate) fn not_configured(port: &str, detail: &str) -> PortError {
    PortError::NotConfigured {
        port: port.to_string(),
        detail: detail.to_string(),
    }
}

/// Resolve a listing path (`/a/b.zip` or `a/b.zip`) under `root`, refusing `..` components.
pub(crate) fn resolve_under(root: &Path, rel: &str) -> Result<std::path::PathBuf, PortError> {
    let rel = Path::new(rel.trim_start_matches(['/', '\\']));
    if rel.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(PortError::Validation(format!(
            "path escapes source root: {}",
            rel.display()
        )));
    }
    Ok(root.join(rel))
}
