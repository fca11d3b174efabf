//! Public types for descriptors, generated content and catalog records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the auto-derived meta description.
pub const META_DESCRIPTION_CHARS: usize = 150;

/// Resource category detected from the file name and extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    UnityAssets,
    SoftwareTools,
    DesignAssets,
    VideoCourses,
    AudioResources,
    Documents,
    #[serde(rename = "3d-models")]
    Models3d,
    Archives,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::UnityAssets,
        Category::SoftwareTools,
        Category::DesignAssets,
        Category::VideoCourses,
        Category::AudioResources,
        Category::Documents,
        Category::Models3d,
        Category::Archives,
        Category::Unknown,
    ];

    /// Slug stored in the catalog and used in object keys (`images/<slug>/...`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::UnityAssets => "unity-assets",
            Category::SoftwareTools => "software-tools",
            Category::DesignAssets => "design-assets",
            Category::VideoCourses => "video-courses",
            Category::AudioResources => "audio-resources",
            Category::Documents => "documents",
            Category::Models3d => "3d-models",
            Category::Archives => "archives",
            Category::Unknown => "unknown",
        }
    }

    /// Human-readable label used when the generated content has none.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::UnityAssets => "Unity Game Development Assets",
            Category::SoftwareTools => "Professional Software Tools",
            Category::DesignAssets => "Design Assets",
            Category::VideoCourses => "Video Courses",
            Category::AudioResources => "Audio Resources",
            Category::Documents => "Documents",
            Category::Models3d => "3D Model Resources",
            Category::Archives => "Archive Bundles",
            Category::Unknown => "Digital Resources",
        }
    }

    pub fn from_slug(slug: &str) -> Category {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == slug)
            .unwrap_or(Category::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work as reported by the listing collaborator. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Path on the listing source (relative to the source root for local listings).
    pub path: String,
    /// Display name (file name).
    pub name: String,
    /// Size in bytes as reported by the source.
    pub size: u64,
    /// Last modification, seconds since epoch.
    pub modified_secs: i64,
    /// Lower-case extension with leading dot, or empty.
    pub file_type: String,
    pub category: Category,
}

/// Generated descriptive content. Absent fields are empty and filled by [`ContentRecord::normalize`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRecord {
    pub title: String,
    /// Secondary title (e.g. English title next to a localized one).
    pub alt_title: String,
    pub description: String,
    pub meta_description: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub category_label: String,
    pub difficulty: String,
    pub requirements: Vec<String>,
    pub features: Vec<String>,
}

impl ContentRecord {
    /// Fill absent fields with defaults derived from the descriptor.
    pub fn normalize(&mut self, descriptor: &ResourceDescriptor) {
        if self.title.trim().is_empty() {
            self.title = crate::engine::tools::title_from_filename(&descriptor.name);
        }
        if self.alt_title.trim().is_empty() {
            self.alt_title = self.title.clone();
        }
        if self.description.trim().is_empty() {
            self.description = format!(
                "{} from the {} collection.",
                self.title,
                descriptor.category.display_name()
            );
        }
        if self.meta_description.trim().is_empty() {
            self.meta_description = self
                .description
                .chars()
                .take(META_DESCRIPTION_CHARS)
                .collect();
        }
        if self.tags.is_empty() {
            self.tags = vec![descriptor.category.as_str().to_string()];
        }
        if self.keywords.is_empty() {
            self.keywords = self.tags.clone();
        }
        if self.category_label.trim().is_empty() {
            self.category_label = descriptor.category.display_name().to_string();
        }
        if self.difficulty.trim().is_empty() {
            self.difficulty = "intermediate".to_string();
        }
    }
}

/// Public URL of the artifact on one hosting platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingLink {
    pub platform: String,
    pub url: String,
}

/// Catalog identifier returned by a [`CatalogStore`](crate::ports::CatalogStore).
pub type CatalogId = i64;

/// Row written by the persistence stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub title: String,
    pub alt_title: String,
    pub description: String,
    pub meta_description: String,
    pub category: Category,
    pub file_size: u64,
    pub file_format: String,
    /// Hex blake3 of the acquired artifact (empty when unavailable).
    pub checksum: String,
    pub source_path: String,
    pub download_links: Vec<HostingLink>,
    pub image_urls: Vec<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub created_at: i64,
    /// Labels of stages whose result was simulated.
    pub simulated_stages: Vec<String>,
}

/// Whether ports contact their collaborators at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Live,
    /// Explicit dry-run: every port returns its simulated result.
    Simulation,
}

/// Why a port returned a simulated result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationReason {
    DryRun,
    NotConfigured,
    /// The real call failed with a degradable error.
    Recovered,
}

/// Where a port result came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    Real,
    Simulated(SimulationReason),
}

impl Provenance {
    pub fn is_simulated(&self) -> bool {
        matches!(self, Provenance::Simulated(_))
    }
}
