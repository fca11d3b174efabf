//! Acquisition by copying from a local source root.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::{not_configured, resolve_under};
use crate::engine::tools::sanitize_filename;
use crate::error::PortError;
use crate::ports::{Acquirer, Collaborator};
use crate::types::ResourceDescriptor;

pub struct LocalAcquirer {
    root: Option<PathBuf>,
}

impl LocalAcquirer {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

impl Collaborator for LocalAcquirer {
    fn name(&self) -> &str {
        "local-acquirer"
    }

    fn is_configured(&self) -> bool {
        self.root.is_some()
    }
}

impl Acquirer for LocalAcquirer {
    fn fetch(
        &self,
        descriptor: &ResourceDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, PortError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| not_configured(self.name(), "source.root is not set"))?;
        let src = resolve_under(root, &descriptor.path)?;
        if !src.is_file() {
            return Err(PortError::NotFound {
                path: src.display().to_string(),
            });
        }

        fs::create_dir_all(dest_dir).map_err(|e| PortError::io("create download dir", dest_dir, e))?;
        let dest = dest_dir.join(sanitize_filename(&descriptor.name));
        let copied = fs::copy(&src, &dest).map_err(|e| PortError::Transfer {
            path: src.display().to_string(),
            detail: e.to_string(),
        })?;
        debug!("copied {} bytes to {}", copied, dest.display());
        Ok(dest)
    }
}
