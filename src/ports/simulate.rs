//! Deterministic simulated results, one per port.
//!
//! Results are structurally identical to real ones (placeholder files exist on disk, URLs are
//! well formed). Tokens derive from blake3 of the inputs, never from clocks.

use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::hashing::token_for;
use crate::engine::tools::{detect_category, detect_file_type, sanitize_filename, title_from_filename};
use crate::error::PortError;
use crate::ports::MediaQuery;
use crate::types::{Category, CatalogId, CatalogRecord, ContentRecord, ResourceDescriptor};

/// Modification time reported for simulated listings (2024-01-01T00:00:00Z).
pub const SIMULATED_MTIME: i64 = 1_704_067_200;

/// Base URL used for simulated object URLs when no public base is configured.
pub const SIMULATED_OBJECT_BASE: &str = "https://objects.simulated.invalid";

const SIMULATED_LISTING: [(&str, u64); 5] = [
    ("LowPolyShooterPack.unitypackage", 124_587_200),
    ("Blender_4.2.1.dmg", 324_598_784),
    ("UI-Components-Pack.psd", 89_246_720),
    ("UnityCourse.zip", 2_345_678_900),
    ("Game_Assets_Collection.7z", 1_567_890_123),
];

/// Five fixed descriptors under `path`.
pub fn simulated_listing(path: &str) -> Vec<ResourceDescriptor> {
    let base = path.trim_end_matches('/');
    SIMULATED_LISTING
        .iter()
        .map(|(name, size)| ResourceDescriptor {
            path: format!("{}/{}", base, name),
            name: name.to_string(),
            size: *size,
            modified_secs: SIMULATED_MTIME,
            file_type: detect_file_type(name),
            category: detect_category(name),
        })
        .collect()
}

/// Write a small placeholder file at `dir/simulated-<name>` so later stages have a real local path.
/// The prefix keeps it apart from the file a late real acquisition would write.
pub fn write_placeholder_artifact(
    descriptor: &ResourceDescriptor,
    dir: &Path,
) -> Result<PathBuf, PortError> {
    fs::create_dir_all(dir).map_err(|e| PortError::io("create download dir", dir, e))?;
    let path = dir.join(format!("simulated-{}", sanitize_filename(&descriptor.name)));
    let body = format!(
        "simulated artifact\nname: {}\nsource: {}\nsize: {}\n",
        descriptor.name, descriptor.path, descriptor.size
    );
    fs::write(&path, body).map_err(|e| PortError::io("write placeholder artifact", &path, e))?;
    Ok(path)
}

/// Template content for the descriptor's category.
pub fn template_content(descriptor: &ResourceDescriptor) -> ContentRecord {
    let base = title_from_filename(&descriptor.name);
    let category = descriptor.category;
    let mut record = ContentRecord {
        title: format!("{} - {}", base, category.display_name()),
        alt_title: format!("{} - Professional {}", base, category.display_name()),
        description: template_description(&descriptor.name, category),
        meta_description: format!(
            "Download {} {}, a professional high-quality resource.",
            base,
            category.display_name()
        ),
        tags: template_tags(&descriptor.name, category),
        keywords: vec![
            category.as_str().to_string(),
            "download".to_string(),
            "resource".to_string(),
            "professional".to_string(),
        ],
        category_label: category.display_name().to_string(),
        difficulty: "intermediate".to_string(),
        requirements: template_requirements(category),
        features: template_features(category),
    };
    record.normalize(descriptor);
    record
}

fn template_description(name: &str, category: Category) -> String {
    let mut desc = match category {
        Category::UnityAssets => {
            "A high-quality Unity asset pack with models, materials, textures and scripts, optimized for mobile and desktop projects."
        }
        Category::SoftwareTools => {
            "A professional software tool with a stable feature set and broad compatibility."
        }
        Category::DesignAssets => {
            "A professional design kit with UI elements and icons that works across common design tools."
        }
        Category::VideoCourses => {
            "A complete video course recorded by an experienced instructor, from fundamentals to advanced topics."
        }
        Category::AudioResources => {
            "A high-quality audio pack of sound effects and music for games, video and multimedia."
        }
        _ => "A high-quality digital resource with professional features.",
    }
    .to_string();

    let lower = name.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if has(&["shooter", "fps", "gun"]) {
        desc.push_str(" Well suited to first-person shooter development.");
    } else if has(&["ui", "interface", "menu"]) {
        desc.push_str(" Focused on interface design and interaction.");
    } else if has(&["blender", "3d", "model"]) {
        desc.push_str(" Built for 3D modeling and rendering.");
    } else if has(&["course", "tutorial", "learn"]) {
        desc.push_str(" Includes guided lessons and practice projects.");
    }
    desc
}

/// Base tags plus keyword tags from the file name, at most ten.
fn template_tags(name: &str, category: Category) -> Vec<String> {
    let lower = name.to_lowercase();
    let mut tags = vec![
        category.as_str().to_string(),
        "professional".to_string(),
        "high-quality".to_string(),
    ];
    let extra: [(&str, [&str; 3]); 5] = [
        ("unity", ["Unity", "game-dev", "3D"]),
        ("ui", ["UI", "interface-design", "UX"]),
        ("shooter", ["shooter", "FPS", "action"]),
        ("course", ["tutorial", "learning", "training"]),
        ("blender", ["Blender", "3D-modeling", "rendering"]),
    ];
    let additional: Vec<String> = extra
        .iter()
        .filter(|(needle, _)| lower.contains(needle))
        .flat_map(|(_, words)| words.iter().map(|w| w.to_string()))
        .take(7)
        .collect();
    tags.extend(additional);
    tags
}

fn template_requirements(category: Category) -> Vec<String> {
    let items: &[&str] = match category {
        Category::UnityAssets => &["Unity 2021.3 or later", "Basic C# knowledge"],
        Category::SoftwareTools => &["Windows, macOS or Linux", "Sufficient disk space"],
        Category::DesignAssets => &["Photoshop, Illustrator or compatible", "Basic design knowledge"],
        Category::VideoCourses => &["Video player", "Network connection"],
        Category::AudioResources => &["Audio playback software", "Sufficient storage"],
        _ => &["Basic operating experience"],
    };
    items.iter().map(|s| s.to_string()).collect()
}

fn template_features(category: Category) -> Vec<String> {
    let items: &[&str] = match category {
        Category::UnityAssets => &["High-quality 3D models", "Optimized performance", "Full documentation", "Easy integration"],
        Category::SoftwareTools => &["Professional features", "Stable", "User friendly", "Regular updates"],
        Category::DesignAssets => &["High resolution", "Multiple formats", "Professional design", "Easy to use"],
        Category::VideoCourses => &["Structured lessons", "Worked examples", "Practice material", "Q&A support"],
        Category::AudioResources => &["High-quality audio", "Multiple formats", "Professional production", "Clear licensing"],
        _ => &["Complete feature set", "Good performance", "Easy to use"],
    };
    items.iter().map(|s| s.to_string()).collect()
}

/// Write `max_count` placeholder image files named `placeholder_<category>_<NN>.txt`.
pub fn write_placeholder_media(
    query: &MediaQuery,
    max_count: usize,
    dir: &Path,
) -> Result<Vec<PathBuf>, PortError> {
    fs::create_dir_all(dir).map_err(|e| PortError::io("create media dir", dir, e))?;
    (1..=max_count)
        .map(|i| {
            let path = dir.join(format!("placeholder_{}_{:02}.txt", query.category, i));
            let body = format!("simulated image {} for {}\n", i, query.title);
            fs::write(&path, body).map_err(|e| PortError::io("write placeholder media", &path, e))?;
            Ok(path)
        })
        .collect()
}

/// `<base>/<key>`, with [`SIMULATED_OBJECT_BASE`] when no public base is configured.
pub fn simulated_object_url(base: Option<&str>, key: &str) -> String {
    let base = base.unwrap_or(SIMULATED_OBJECT_BASE).trim_end_matches('/');
    format!("{}/{}", base, key.trim_start_matches('/'))
}

pub fn simulated_hosting_url(platform: &str, filename: &str) -> String {
    let token = token_for(&[platform, filename]);
    format!(
        "https://{}.simulated.invalid/{}/{}",
        sanitize_filename(&platform.to_lowercase()),
        token,
        sanitize_filename(filename)
    )
}

/// Positive id derived from the record's identity fields (title, source path, checksum).
pub fn simulated_catalog_id(record: &CatalogRecord) -> CatalogId {
    let hash = blake3::hash(
        [
            record.title.as_str(),
            record.source_path.as_str(),
            record.checksum.as_str(),
        ]
        .join("\0")
        .as_bytes(),
    );
    let mut buf = [0u8; 8];
    buf[..6].copy_from_slice(&hash.as_bytes()[..6]);
    (i64::from_le_bytes(buf)).max(1)
}
