//! Enrichment from JSON sidecar files next to the source (`<file>.meta.json`).

use std::fs;
use std::path::{Path, PathBuf};

use super::{not_configured, resolve_under};
use crate::error::PortError;
use crate::pipeline::metadata::FileMetadata;
use crate::ports::{Collaborator, Enricher};
use crate::types::{ContentRecord, ResourceDescriptor};
use crate::utils::config::ARCHIVE_CONTENTS_LIMIT;

pub struct SidecarEnricher {
    root: Option<PathBuf>,
    suffix: String,
}

impl SidecarEnricher {
    pub fn new(root: Option<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            root,
            suffix: suffix.into(),
        }
    }

    /// Sidecar location for a descriptor.
    pub fn sidecar_path(&self, root: &Path, descriptor: &ResourceDescriptor) -> Result<PathBuf, PortError> {
        let mut os = resolve_under(root, &descriptor.path)?.into_os_string();
        os.push(&self.suffix);
        Ok(PathBuf::from(os))
    }
}

impl Collaborator for SidecarEnricher {
    fn name(&self) -> &str {
        "sidecar-enricher"
    }

    fn is_configured(&self) -> bool {
        self.root.is_some()
    }
}

impl Enricher for SidecarEnricher {
    fn generate(
        &self,
        descriptor: &ResourceDescriptor,
        metadata: &FileMetadata,
        _local_path: &Path,
    ) -> Result<ContentRecord, PortError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| not_configured(self.name(), "source.root is not set"))?;
        let sidecar = self.sidecar_path(root, descriptor)?;
        let text = fs::read_to_string(&sidecar).map_err(|e| {
            PortError::Generation(format!("read {}: {}", sidecar.display(), e))
        })?;
        let mut record: ContentRecord = serde_json::from_str(&text).map_err(|e| {
            PortError::Generation(format!("parse {}: {}", sidecar.display(), e))
        })?;

        if record.requirements.is_empty()
            && let Some(platform) = &metadata.platform
        {
            record.requirements.push(format!("{} operating system", platform));
        }
        if record.features.is_empty() && !metadata.archive_contents.is_empty() {
            let n = metadata.archive_contents.len();
            let more = if n >= ARCHIVE_CONTENTS_LIMIT { "+" } else { "" };
            record.features.push(format!(
                "Archive with {}{} files, including {}",
                n, more, metadata.archive_contents[0]
            ));
        }
        record.normalize(descriptor);
        Ok(record)
    }
}
