//! Media search over a local image library directory.

use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::not_configured;
use crate::engine::hashing::token_for;
use crate::engine::tools::{is_image_file, sanitize_filename};
use crate::error::PortError;
use crate::ports::{Collaborator, MediaQuery, MediaSource};

/// Picks images from `library_dir`: names sharing a word with the query first, then by name.
pub struct MediaLibrary {
    library_dir: Option<PathBuf>,
}

impl MediaLibrary {
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }
}

fn words(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
}

impl Collaborator for MediaLibrary {
    fn name(&self) -> &str {
        "media-library"
    }

    fn is_configured(&self) -> bool {
        self.library_dir.is_some()
    }
}

impl MediaSource for MediaLibrary {
    fn find(
        &self,
        query: &MediaQuery,
        max_count: usize,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, PortError> {
        let lib = self
            .library_dir
            .as_ref()
            .ok_or_else(|| not_configured(self.name(), "media.library_dir is not set"))?;
        let entries = fs::read_dir(lib).map_err(|e| PortError::Unavailable {
            port: self.name().to_string(),
            detail: format!("{}: {}", lib.display(), e),
        })?;

        let mut images: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        images.sort();

        let wanted: HashSet<String> = words(&query.title)
            .chain(query.tags.iter().flat_map(|t| words(t)))
            .collect();
        let relevant = |p: &PathBuf| {
            p.file_stem()
                .map(|s| words(&s.to_string_lossy()).any(|w| wanted.contains(&w)))
                .unwrap_or(false)
        };
        // Stable: relevant images first, name order within each group.
        images.sort_by_key(|p| !relevant(p));

        if images.is_empty() || max_count == 0 {
            return Ok(Vec::new());
        }
        fs::create_dir_all(dest_dir).map_err(|e| PortError::io("create media dir", dest_dir, e))?;
        let prefix = token_for(&[&query.title, query.category.as_str()]);

        let mut out: Vec<PathBuf> = Vec::new();
        for src in images.into_iter().take(max_count) {
            let file_name = src
                .file_name()
                .map(|n| sanitize_filename(&n.to_string_lossy()))
                .unwrap_or_else(|| "image".to_string());
            let dest = dest_dir.join(format!("{}_{}", prefix, file_name));
            if let Err(e) = fs::copy(&src, &dest) {
                // The caller never sees these paths on error, so remove them here.
                for done in &out {
                    if let Err(rm) = fs::remove_file(done) {
                        warn!("media: could not remove partial copy {}: {}", done.display(), rm);
                    }
                }
                return Err(PortError::Transfer {
                    path: src.display().to_string(),
                    detail: e.to_string(),
                });
            }
            out.push(dest);
        }
        debug!("media: {} images for {:?}", out.len(), query.title);
        Ok(out)
    }
}
