//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    settings_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            let short = pkg.split('-').next().unwrap_or(pkg);
            PackagePaths {
                pkg_name: pkg,
                settings_filename: format!("{short}.toml"),
                env_prefix: format!("{}_", short.to_uppercase()),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Default settings file name (`reslibs.toml`).
    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    /// Prefix of environment overrides (`RESLIBS_`).
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Environment files loaded before overrides, in order.
    pub fn env_files(&self) -> [&'static str; 2] {
        [".env.automation", ".env"]
    }
}

// ---- Settings defaults ----

/// Defaults applied when a settings field is absent.
pub struct Defaults;

impl Defaults {
    pub const DOWNLOAD_DIR: &'static str = "./temp/downloads";
    pub const MAX_FILE_SIZE: &'static str = "5GB";
    pub const SIDECAR_SUFFIX: &'static str = ".meta.json";
    pub const MEDIA_DOWNLOAD_DIR: &'static str = "./temp/images";
    pub const MEDIA_PER_RESOURCE: usize = 5;
    /// Upper bound accepted by validation.
    pub const MEDIA_PER_RESOURCE_MAX: usize = 20;
    pub const CATALOG_PATH: &'static str = "./data/catalog.db";
    pub const PAUSE_BETWEEN_ITEMS_SECS: u64 = 3;
    /// Per-invocation port timeout. 0 disables.
    pub const PORT_TIMEOUT_SECS: u64 = 3600;
    pub const DISK_SPACE_THRESHOLD: &'static str = "10GB";
    pub const LIMIT: usize = 1;
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
    /// Bytes of blake3 output kept for URL tokens (hex-encoded, so twice as many chars).
    pub const TOKEN_BYTES: usize = 8;
}

// ---- Metadata ----

/// Entry names kept from an archive listing.
pub const ARCHIVE_CONTENTS_LIMIT: usize = 50;

// ---- Catalog ----

/// Status written to every new catalog record.
pub const PUBLISHED_STATUS: &str = "published";

/// Default row count for `recent` queries.
pub const RECENT_LIMIT: usize = 10;
