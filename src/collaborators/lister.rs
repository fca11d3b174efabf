//! Directory listing with walkdir.

use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

use super::{not_configured, resolve_under};
use crate::engine::tools::{
    detect_category, detect_file_type, is_os_hidden_file, modified_secs, path_relative_to,
    path_to_listing_string,
};
use crate::error::PortError;
use crate::ports::{Collaborator, Lister};
use crate::types::ResourceDescriptor;

/// Lists files under `root/<path>`. Descriptor paths are relative to `root`.
pub struct DirectoryLister {
    root: Option<PathBuf>,
    skip_suffixes: Vec<String>,
}

impl DirectoryLister {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            skip_suffixes: Vec::new(),
        }
    }

    /// Leave out files ending in `suffix` (e.g. enrichment sidecars).
    pub fn skipping_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.skip_suffixes.push(suffix.into());
        self
    }

    fn is_skipped(&self, name: &str) -> bool {
        self.skip_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

impl Collaborator for DirectoryLister {
    fn name(&self) -> &str {
        "directory-lister"
    }

    fn is_configured(&self) -> bool {
        self.root.is_some()
    }
}

impl Lister for DirectoryLister {
    fn list(&self, path: &str, recursive: bool) -> Result<Vec<ResourceDescriptor>, PortError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| not_configured(self.name(), "source.root is not set"))?;
        let dir = resolve_under(root, path)?;
        if !dir.is_dir() {
            return Err(PortError::Unavailable {
                port: self.name().to_string(),
                detail: format!("{} is not a directory", dir.display()),
            });
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut out = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("listing: skipping entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || is_os_hidden_file(entry.path()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if self.is_skipped(&name) {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!("listing: {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            let rel = path_relative_to(entry.path(), root).unwrap_or_else(|| entry.path().to_path_buf());
            out.push(ResourceDescriptor {
                path: path_to_listing_string(&rel),
                file_type: detect_file_type(&name),
                category: detect_category(&name),
                size: meta.len(),
                modified_secs: modified_secs(&meta),
                name,
            });
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("listed {} files under {}", out.len(), dir.display());
        Ok(out)
    }
}
