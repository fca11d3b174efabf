//! File metadata extracted from the acquired artifact before enrichment.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::{debug, warn};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::engine::hashing::hash_file_hex;
use crate::engine::tools::{content_type_for, platform_hint};
use crate::types::{Category, ResourceDescriptor};
use crate::utils::config::ARCHIVE_CONTENTS_LIMIT;

/// Facts about the local artifact handed to the enricher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub name: String,
    pub file_type: String,
    pub category: Category,
    /// Size on local storage; the descriptor's size when the file cannot be read.
    pub size: u64,
    pub modified_secs: i64,
    pub content_type: String,
    /// Hex blake3 of the local artifact, empty when it could not be hashed.
    pub checksum: String,
    /// Operating system implied by installer extensions.
    pub platform: Option<String>,
    /// First file entries of an archive, in archive order. Empty for other files.
    pub archive_contents: Vec<String>,
}

impl FileMetadata {
    /// Metadata from the descriptor alone.
    pub fn from_descriptor(descriptor: &ResourceDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            file_type: descriptor.file_type.clone(),
            category: descriptor.category,
            size: descriptor.size,
            modified_secs: descriptor.modified_secs,
            content_type: content_type_for(Path::new(&descriptor.name)).to_string(),
            checksum: String::new(),
            platform: platform_hint(&descriptor.file_type).map(str::to_string),
            archive_contents: Vec::new(),
        }
    }
}

/// Read size, checksum and archive listing from `local_path`. Read failures are warnings;
/// descriptor values stand in.
pub fn extract_metadata(descriptor: &ResourceDescriptor, local_path: &Path) -> FileMetadata {
    let mut meta = FileMetadata::from_descriptor(descriptor);
    match std::fs::metadata(local_path) {
        Ok(m) => meta.size = m.len(),
        Err(e) => warn!("metadata for {}: {}", local_path.display(), e),
    }
    match hash_file_hex(local_path) {
        Ok(hex) => meta.checksum = hex,
        Err(e) => warn!("checksum for {}: {:#}", local_path.display(), e),
    }
    if is_archive(&descriptor.file_type) {
        match list_archive_contents(local_path, &descriptor.file_type, ARCHIVE_CONTENTS_LIMIT) {
            Ok(names) => meta.archive_contents = names,
            Err(e) => warn!("archive listing for {}: {:#}", local_path.display(), e),
        }
    }
    meta
}

/// Extensions treated as archives.
pub fn is_archive(file_type: &str) -> bool {
    matches!(file_type, ".zip" | ".rar" | ".7z" | ".tar" | ".gz" | ".tgz")
}

/// Up to `limit` file names inside the archive at `path`, without extracting.
///
/// `.zip`, `.tar` and gzip-compressed tar are read; `.rar` and `.7z` have no reader and list
/// nothing.
pub fn list_archive_contents(path: &Path, file_type: &str, limit: usize) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("open archive {}", path.display()))?;
    match file_type {
        ".zip" => list_zip(file, limit),
        ".tar" => list_tar(file, limit),
        ".gz" | ".tgz" => list_tar(GzDecoder::new(file), limit),
        other => {
            debug!("no archive reader for {}", other);
            Ok(Vec::new())
        }
    }
}

fn list_zip(file: File, limit: usize) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(file).context("decode zip")?;
    let mut names = Vec::new();
    for index in 0..archive.len() {
        if names.len() >= limit {
            break;
        }
        let entry = archive
            .by_index_raw(index)
            .with_context(|| format!("read zip entry {}", index))?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }
    Ok(names)
}

fn list_tar<R: Read>(reader: R, limit: usize) -> Result<Vec<String>> {
    let mut archive = tar::Archive::new(reader);
    let mut names = Vec::new();
    for entry in archive.entries().context("read tar entries")? {
        if names.len() >= limit {
            break;
        }
        let entry = entry.context("read tar entry")?;
        if entry.header().entry_type().is_dir() {
            continue;
        }
        let path = entry.path().context("tar entry path")?;
        names.push(path.to_string_lossy().replace('\\', "/"));
    }
    Ok(names)
}
