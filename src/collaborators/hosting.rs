//! Hosting platform that mirrors files into a served directory.

use std::fs;
use std::path::{Path, PathBuf};

use super::not_configured;
use crate::engine::hashing::{hash_file, to_hex};
use crate::engine::tools::sanitize_filename;
use crate::error::PortError;
use crate::ports::{Collaborator, HostingPlatform};
use crate::utils::config::HashingConsts;

/// Copies to `<dir>/<token>/<filename>` and answers `<base_url>/<token>/<filename>`.
/// The token is a prefix of the file's blake3, so re-uploads of identical bytes share a URL.
pub struct MirrorPlatform {
    name: String,
    dir: Option<PathBuf>,
    base_url: Option<String>,
}

impl MirrorPlatform {
    pub fn new(name: impl Into<String>, dir: Option<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            dir,
            base_url: base_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl Collaborator for MirrorPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        self.dir.is_some() && self.base_url.is_some()
    }
}

impl HostingPlatform for MirrorPlatform {
    fn put(&self, local_path: &Path, filename: &str) -> Result<String, PortError> {
        let (Some(dir), Some(base)) = (&self.dir, &self.base_url) else {
            return Err(not_configured(&self.name, "dir and base_url are required"));
        };
        let upload_err = |detail: String| PortError::Upload {
            target: self.name.clone(),
            detail,
        };

        let hash = hash_file(local_path).map_err(|e| upload_err(format!("{:#}", e)))?;
        let token = to_hex(&hash[..HashingConsts::TOKEN_BYTES]);
        let filename = sanitize_filename(filename);
        let folder = dir.join(&token);
        fs::create_dir_all(&folder).map_err(|e| upload_err(format!("{}: {}", folder.display(), e)))?;
        let target = folder.join(&filename);
        fs::copy(local_path, &target).map_err(|e| upload_err(format!("{}: {}", target.display(), e)))?;

        Ok(format!("{}/{}/{}", base.trim_end_matches('/'), token, filename))
    }
}
