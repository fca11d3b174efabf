//! Per-resource accumulator and lifecycle phases.

use std::fmt;
use std::path::PathBuf;

use crate::pipeline::metadata::FileMetadata;
use crate::types::{CatalogId, ContentRecord, HostingLink};

/// Lifecycle of one resource through the processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourcePhase {
    Created,
    Acquiring,
    Enriching,
    SourcingMedia,
    Replicating,
    Persisting,
    Completed,
    Aborted,
}

impl ResourcePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResourcePhase::Completed | ResourcePhase::Aborted)
    }

    /// Stage label for phases that run a stage.
    pub fn stage_label(&self) -> &'static str {
        match self {
            ResourcePhase::Created => "created",
            ResourcePhase::Acquiring => "acquire",
            ResourcePhase::Enriching => "enrich",
            ResourcePhase::SourcingMedia => "source-media",
            ResourcePhase::Replicating => "replicate",
            ResourcePhase::Persisting => "persist",
            ResourcePhase::Completed => "completed",
            ResourcePhase::Aborted => "aborted",
        }
    }
}

impl fmt::Display for ResourcePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stage_label())
    }
}

/// Mutable state owned by exactly one processor run. Dropped after cleanup.
#[derive(Debug, Default)]
pub struct ResourceState {
    /// Set by Acquire.
    pub local_path: Option<PathBuf>,
    /// Set by Enrich.
    pub metadata: Option<FileMetadata>,
    pub content: Option<ContentRecord>,
    /// Local media downloads, deleted during cleanup.
    pub media_files: Vec<PathBuf>,
    /// Set by SourceMedia.
    pub media_urls: Vec<String>,
    /// Set by Replicate.
    pub hosting_links: Vec<HostingLink>,
    /// Set by Persist.
    pub catalog_id: Option<CatalogId>,
    /// Stage/port labels whose result was simulated.
    pub simulated: Vec<String>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_simulated(&mut self, label: &str) {
        if !self.simulated.iter().any(|s| s == label) {
            self.simulated.push(label.to_string());
        }
    }

    /// Every locally materialized file this run created.
    pub fn local_artifacts(&self) -> Vec<PathBuf> {
        self.local_path
            .iter()
            .cloned()
            .chain(self.media_files.iter().cloned())
            .collect()
    }
}
