//! Layered settings: defaults, then `reslibs.toml`, then `RESLIBS_*` environment (after loading
//! `.env.automation` / `.env`), then CLI flags applied by the caller.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::engine::tools::parse_size;
use crate::utils::config::{Defaults, PackagePaths};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub download: DownloadSettings,
    pub enrich: EnrichSettings,
    pub media: MediaSettings,
    pub object_store: ObjectStoreSettings,
    pub hosting: HostingSettings,
    pub catalog: CatalogSettings,
    pub system: SystemSettings,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Listing path (required).
    pub path: String,
    /// Local directory the listing path is resolved against. Unset: listing is simulated.
    pub root: Option<PathBuf>,
    pub recursive: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub dir: PathBuf,
    /// Human size, e.g. `"5GB"`.
    pub max_file_size: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(Defaults::DOWNLOAD_DIR),
            max_file_size: Defaults::MAX_FILE_SIZE.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EnrichSettings {
    pub sidecar_suffix: String,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            sidecar_suffix: Defaults::SIDECAR_SUFFIX.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub library_dir: Option<PathBuf>,
    pub download_dir: PathBuf,
    pub per_resource: usize,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            library_dir: None,
            download_dir: PathBuf::from(Defaults::MEDIA_DOWNLOAD_DIR),
            per_resource: Defaults::MEDIA_PER_RESOURCE,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ObjectStoreSettings {
    pub dir: Option<PathBuf>,
    pub public_base_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HostingSettings {
    pub platforms: Vec<PlatformSettings>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub name: String,
    pub dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

/// Catalog implementation, chosen once when ports are built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    #[default]
    Sqlite,
    Memory,
}

impl FromStr for CatalogBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(CatalogBackend::Sqlite),
            "memory" => Ok(CatalogBackend::Memory),
            other => bail!("unknown catalog backend {:?} (expected sqlite or memory)", other),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub backend: CatalogBackend,
    pub path: PathBuf,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Sqlite,
            path: PathBuf::from(Defaults::CATALOG_PATH),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    pub dry_run: bool,
    pub pause_between_items_secs: u64,
    /// 0 disables the per-invocation timeout.
    pub port_timeout_secs: u64,
    pub disk_space_threshold: String,
    pub verbose: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            pause_between_items_secs: Defaults::PAUSE_BETWEEN_ITEMS_SECS,
            port_timeout_secs: Defaults::PORT_TIMEOUT_SECS,
            disk_space_threshold: Defaults::DISK_SPACE_THRESHOLD.to_string(),
            verbose: false,
        }
    }
}

/// Overwrite a settings field from an environment value when present.
macro_rules! apply_env_opt {
    ($lookup:expr, $key:expr => $target:expr, $conv:expr) => {
        if let Some(v) = $lookup($key) {
            $target = $conv(&v).with_context(|| format!("invalid value for {}", $key))?;
        }
    };
}

fn as_string(v: &str) -> Result<String> {
    Ok(v.to_string())
}

fn as_path(v: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(v))
}

fn as_some_path(v: &str) -> Result<Option<PathBuf>> {
    Ok((!v.is_empty()).then(|| PathBuf::from(v)))
}

fn as_some_string(v: &str) -> Result<Option<String>> {
    Ok((!v.is_empty()).then(|| v.to_string()))
}

fn as_bool(v: &str) -> Result<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got {:?}", other),
    }
}

fn as_u64(v: &str) -> Result<u64> {
    v.trim().parse().map_err(Into::into)
}

impl Settings {
    /// Parse settings from TOML text. Absent sections keep defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse settings TOML")
    }

    /// Load the settings file and environment overrides.
    ///
    /// An explicit `path` must exist; the default `reslibs.toml` may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let paths = PackagePaths::get();
        let mut settings = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("read settings file {}", p.display()))?;
                Self::from_toml_str(&text).with_context(|| p.display().to_string())?
            }
            None => {
                let default = Path::new(paths.settings_filename());
                match std::fs::read_to_string(default) {
                    Ok(text) => Self::from_toml_str(&text)
                        .with_context(|| default.display().to_string())?,
                    Err(_) => Self::default(),
                }
            }
        };

        for file in paths.env_files() {
            let _ = dotenvy::from_filename(file);
        }
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply `RESLIBS_*` overrides using `lookup` (the process environment in [`Settings::load`]).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = PackagePaths::get().env_prefix();
        let get = |name: &str| lookup(&format!("{prefix}{name}"));

        apply_env_opt!(get, "SOURCE_PATH" => self.source.path, as_string);
        apply_env_opt!(get, "SOURCE_ROOT" => self.source.root, as_some_path);
        apply_env_opt!(get, "DOWNLOAD_DIR" => self.download.dir, as_path);
        apply_env_opt!(get, "MEDIA_LIBRARY_DIR" => self.media.library_dir, as_some_path);
        apply_env_opt!(get, "OBJECT_STORE_DIR" => self.object_store.dir, as_some_path);
        apply_env_opt!(get, "PUBLIC_BASE_URL" => self.object_store.public_base_url, as_some_string);
        apply_env_opt!(get, "CATALOG_BACKEND" => self.catalog.backend, CatalogBackend::from_str);
        apply_env_opt!(get, "CATALOG_PATH" => self.catalog.path, as_path);
        apply_env_opt!(get, "DRY_RUN" => self.system.dry_run, as_bool);
        apply_env_opt!(get, "PAUSE_SECS" => self.system.pause_between_items_secs, as_u64);
        Ok(())
    }

    /// Check every field and report all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.source.path.trim().is_empty() {
            problems.push("source.path is required".to_string());
        }
        if let Err(e) = parse_size(&self.download.max_file_size) {
            problems.push(format!("download.max_file_size: {}", e));
        }
        if let Err(e) = parse_size(&self.system.disk_space_threshold) {
            problems.push(format!("system.disk_space_threshold: {}", e));
        }
        if self.media.per_resource > Defaults::MEDIA_PER_RESOURCE_MAX {
            problems.push(format!(
                "media.per_resource must be at most {}",
                Defaults::MEDIA_PER_RESOURCE_MAX
            ));
        }
        if self.enrich.sidecar_suffix.is_empty() {
            problems.push("enrich.sidecar_suffix must not be empty".to_string());
        }
        let mut seen = HashSet::new();
        for (i, p) in self.hosting.platforms.iter().enumerate() {
            if p.name.trim().is_empty() {
                problems.push(format!("hosting.platforms[{}].name is required", i));
            } else if !seen.insert(p.name.as_str()) {
                problems.push(format!("hosting.platforms: duplicate name {:?}", p.name));
            }
        }
        if self.catalog.backend == CatalogBackend::Sqlite && self.catalog.path.as_os_str().is_empty() {
            problems.push("catalog.path is required for the sqlite backend".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            bail!("invalid configuration:\n  - {}", problems.join("\n  - "))
        }
    }

    /// Per-invocation port timeout, `None` when disabled.
    pub fn port_timeout(&self) -> Option<Duration> {
        (self.system.port_timeout_secs > 0).then(|| Duration::from_secs(self.system.port_timeout_secs))
    }

    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.system.pause_between_items_secs)
    }

    pub fn disk_threshold_bytes(&self) -> Result<u64> {
        parse_size(&self.system.disk_space_threshold)
    }

    /// Text printed by `--show-config`.
    pub fn summary(&self) -> String {
        let opt_path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not configured, simulated)".to_string())
        };
        let mut out = String::new();
        let _ = writeln!(out, "{} configuration", PackagePaths::get().pkg_name());
        let _ = writeln!(out, "  source.path           {}", self.source.path);
        let _ = writeln!(out, "  source.root           {}", opt_path(&self.source.root));
        let _ = writeln!(out, "  source.recursive      {}", self.source.recursive);
        let _ = writeln!(out, "  download.dir          {}", self.download.dir.display());
        let _ = writeln!(out, "  download.max_file_size {}", self.download.max_file_size);
        let _ = writeln!(out, "  media.library_dir     {}", opt_path(&self.media.library_dir));
        let _ = writeln!(out, "  media.per_resource    {}", self.media.per_resource);
        let _ = writeln!(out, "  object_store.dir      {}", opt_path(&self.object_store.dir));
        let _ = writeln!(
            out,
            "  object_store.url      {}",
            self.object_store.public_base_url.as_deref().unwrap_or("(not configured)")
        );
        if self.hosting.platforms.is_empty() {
            let _ = writeln!(out, "  hosting               (none)");
        }
        for p in &self.hosting.platforms {
            let _ = writeln!(
                out,
                "  hosting.{:<14}{}",
                p.name,
                p.base_url.as_deref().unwrap_or("(not configured, simulated)")
            );
        }
        let _ = writeln!(
            out,
            "  catalog               {:?} {}",
            self.catalog.backend,
            self.catalog.path.display()
        );
        let _ = writeln!(out, "  system.dry_run        {}", self.system.dry_run);
        let _ = writeln!(out, "  system.pause          {}s", self.system.pause_between_items_secs);
        let _ = write!(out, "  system.port_timeout   {}s", self.system.port_timeout_secs);
        out
    }
}
