//! Free-space preflight for the download directory.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use sysinfo::Disks;

use crate::engine::tools::format_size;

/// Free bytes on the disk holding `path` (longest matching mount point), if one is found.
pub fn available_space(path: &Path) -> Option<u64> {
    let abs = absolute_existing(path);
    let disks = Disks::new_with_refreshed_list();
    let path_str = abs.to_string_lossy();
    let disk = disks
        .iter()
        .filter(|d| path_str.starts_with(d.mount_point().to_string_lossy().as_ref()))
        .max_by_key(|d| d.mount_point().to_string_lossy().len());

    match disk {
        Some(d) => {
            debug!(
                "disk for {}: mount={}, available={}",
                abs.display(),
                d.mount_point().display(),
                format_size(d.available_space())
            );
            Some(d.available_space())
        }
        None => {
            debug!("No disk found for path: {}", abs.display());
            None
        }
    }
}

/// Warn when free space under `path` is below `threshold` bytes. Returns true when space is low.
pub fn warn_if_low_space(path: &Path, threshold: u64) -> bool {
    match available_space(path) {
        Some(free) if free < threshold => {
            warn!(
                "low disk space under {}: {} free, threshold {}",
                path.display(),
                format_size(free),
                format_size(threshold)
            );
            true
        }
        _ => false,
    }
}

/// Canonical form of `path`, or of its nearest existing ancestor (the download dir may not exist yet).
fn absolute_existing(path: &Path) -> PathBuf {
    let mut candidate = path.to_path_buf();
    loop {
        if let Ok(c) = candidate.canonicalize() {
            return c;
        }
        if !candidate.pop() {
            return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        }
    }
}
