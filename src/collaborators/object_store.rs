//! Object store backed by a directory served at a public base URL.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{not_configured, resolve_under};
use crate::error::PortError;
use crate::ports::{Collaborator, ObjectStore};

/// Copies objects to `dir/<key>` and answers `<public_base_url>/<key>`.
pub struct DirectoryObjectStore {
    dir: Option<PathBuf>,
    public_base_url: Option<String>,
}

#[derive(Serialize)]
struct ObjectMeta<'a> {
    key: &'a str,
    content_type: &'a str,
    metadata: &'a BTreeMap<String, String>,
}

impl DirectoryObjectStore {
    pub fn new(dir: Option<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            dir,
            public_base_url: public_base_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl Collaborator for DirectoryObjectStore {
    fn name(&self) -> &str {
        "directory-object-store"
    }

    fn is_configured(&self) -> bool {
        self.dir.is_some() && self.public_base_url.is_some()
    }
}

impl ObjectStore for DirectoryObjectStore {
    fn put(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<String, PortError> {
        let (Some(dir), Some(base)) = (&self.dir, &self.public_base_url) else {
            return Err(not_configured(
                self.name(),
                "object_store.dir and object_store.public_base_url are required",
            ));
        };
        let target = resolve_under(dir, key)?;
        let upload_err = |detail: String| PortError::Upload {
            target: key.to_string(),
            detail,
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| upload_err(format!("{}: {}", parent.display(), e)))?;
        }
        fs::copy(local_path, &target).map_err(|e| upload_err(format!("{}: {}", local_path.display(), e)))?;

        let meta = ObjectMeta {
            key,
            content_type,
            metadata,
        };
        let json = serde_json::to_string_pretty(&meta).map_err(|e| upload_err(e.to_string()))?;
        let mut meta_path = target.into_os_string();
        meta_path.push(".meta.json");
        fs::write(PathBuf::from(meta_path), json).map_err(|e| upload_err(e.to_string()))?;

        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            key.trim_start_matches('/')
        ))
    }
}
