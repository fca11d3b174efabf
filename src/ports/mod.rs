//! Collaborator traits and the ports that wrap them.
//!
//! Every external capability (listing, acquisition, enrichment, media search, object storage,
//! hosting, catalog) is a trait here. The pipeline never calls a trait object directly: each one
//! sits behind a [`DegradablePort`] that decides between the real call and a simulated result.

pub mod degradable;
pub mod set;
pub mod simulate;

pub use degradable::{Degraded, DegradablePort, Fallback};
pub use set::PortSet;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::PortError;
use crate::pipeline::metadata::FileMetadata;
use crate::types::{Category, CatalogId, CatalogRecord, ContentRecord, ResourceDescriptor};

/// Common surface of every collaborator.
pub trait Collaborator: Send + Sync {
    fn name(&self) -> &str;

    /// False when credentials or target locations are missing. Unconfigured collaborators are
    /// never called; their port simulates instead.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Lists candidate resources under a source path.
pub trait Lister: Collaborator {
    fn list(&self, path: &str, recursive: bool) -> Result<Vec<ResourceDescriptor>, PortError>;
}

/// Materializes a resource's bytes on local storage.
pub trait Acquirer: Collaborator {
    /// Returns the local path of the acquired file (inside `dest_dir`).
    fn fetch(&self, descriptor: &ResourceDescriptor, dest_dir: &Path)
    -> Result<PathBuf, PortError>;
}

/// Produces descriptive content for a resource.
pub trait Enricher: Collaborator {
    fn generate(
        &self,
        descriptor: &ResourceDescriptor,
        metadata: &FileMetadata,
        local_path: &Path,
    ) -> Result<ContentRecord, PortError>;
}

/// What the media stage searches for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaQuery {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Category,
}

/// Finds illustrative images and downloads them locally. An empty result is valid.
pub trait MediaSource: Collaborator {
    fn find(
        &self,
        query: &MediaQuery,
        max_count: usize,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, PortError>;
}

/// Object storage with public URLs.
pub trait ObjectStore: Collaborator {
    fn put(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<String, PortError>;
}

/// One public file-hosting platform. [`Collaborator::name`] is the platform key in fan-out results.
pub trait HostingPlatform: Collaborator {
    fn put(&self, local_path: &Path, filename: &str) -> Result<String, PortError>;
}

/// Persists catalog records.
pub trait CatalogStore: Collaborator {
    fn create(&self, record: &CatalogRecord) -> Result<CatalogId, PortError>;
}
