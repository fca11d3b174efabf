use reslibs_ingest::engine::{
    content_type_for, detect_category, detect_file_type, format_size, parse_size,
    sanitize_filename, title_from_filename, token_for,
};
use reslibs_ingest::engine::tools::{path_relative_to, path_to_listing_string, platform_hint};
use reslibs_ingest::ports::simulate::{
    simulated_catalog_id, simulated_hosting_url, simulated_listing, simulated_object_url,
    template_content,
};
use reslibs_ingest::{Category, ContentRecord, META_DESCRIPTION_CHARS, ResourceDescriptor};
use std::path::{Path, PathBuf};

fn descriptor(name: &str) -> ResourceDescriptor {
    ResourceDescriptor {
        path: format!("/incoming/{}", name),
        name: name.to_string(),
        size: 42,
        modified_secs: 0,
        file_type: detect_file_type(name),
        category: detect_category(name),
    }
}

// --- path helpers ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/srv/res");
    let path = PathBuf::from("/srv/res/packs/a.zip");
    assert_eq!(path_relative_to(&path, &base), Some(PathBuf::from("packs/a.zip")));
}

#[test]
fn test_path_relative_not_under_base() {
    assert_eq!(path_relative_to(Path::new("/other/a.zip"), Path::new("/srv/res")), None);
}

#[test]
fn test_listing_string_normalizes_backslashes() {
    assert_eq!(path_to_listing_string(Path::new("packs\\a.zip")), "packs/a.zip");
}

// --- detection ---

#[test]
fn test_detect_file_type_lowercases_extension() {
    assert_eq!(detect_file_type("Pack.UnityPackage"), ".unitypackage");
    assert_eq!(detect_file_type("README"), "");
}

#[test]
fn test_detect_category_by_extension() {
    assert_eq!(detect_category("LowPolyShooterPack.unitypackage"), Category::UnityAssets);
    assert_eq!(detect_category("Blender_4.2.1.dmg"), Category::SoftwareTools);
    assert_eq!(detect_category("UI-Components-Pack.psd"), Category::DesignAssets);
    assert_eq!(detect_category("intro.mp4"), Category::VideoCourses);
    assert_eq!(detect_category("boom.wav"), Category::AudioResources);
    assert_eq!(detect_category("manual.pdf"), Category::Documents);
    assert_eq!(detect_category("tree.fbx"), Category::Models3d);
    assert_eq!(detect_category("Game_Assets_Collection.7z"), Category::Archives);
    assert_eq!(detect_category("notes"), Category::Unknown);
}

#[test]
fn test_detect_category_keywords_checked_in_order() {
    // "unity" wins over the archive extension.
    assert_eq!(detect_category("UnityCourse.zip"), Category::UnityAssets);
    assert_eq!(detect_category("PythonCourse.zip"), Category::VideoCourses);
}

#[test]
fn test_content_type_for_known_and_unknown() {
    assert_eq!(content_type_for(Path::new("a.JPG")), "image/jpeg");
    assert_eq!(content_type_for(Path::new("a.png")), "image/png");
    assert_eq!(content_type_for(Path::new("a.zip")), "application/zip");
    assert_eq!(content_type_for(Path::new("a.weird")), "application/octet-stream");
}

#[test]
fn test_platform_hint() {
    assert_eq!(platform_hint(".exe"), Some("Windows"));
    assert_eq!(platform_hint(".dmg"), Some("macOS"));
    assert_eq!(platform_hint(".zip"), None);
}

// --- sizes ---

#[test]
fn test_parse_size_units() {
    assert_eq!(parse_size("5GB").unwrap(), 5 * 1024 * 1024 * 1024);
    assert_eq!(parse_size("512 mb").unwrap(), 512 * 1024 * 1024);
    assert_eq!(parse_size("64KB").unwrap(), 64 * 1024);
    assert_eq!(parse_size("100B").unwrap(), 100);
    assert_eq!(parse_size("1024").unwrap(), 1024);
    assert_eq!(parse_size("1.5GB").unwrap(), 1_610_612_736);
}

#[test]
fn test_parse_size_rejects_garbage() {
    assert!(parse_size("").is_err());
    assert!(parse_size("GB").is_err());
    assert!(parse_size("lots").is_err());
    assert!(parse_size("-3MB").is_err());
}

#[test]
fn test_format_size() {
    assert_eq!(format_size(512), "512 B");
    assert_eq!(format_size(1536), "1.50 KB");
    assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
}

// --- names ---

#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("a/b\\c:d.zip"), "a_b_c_d.zip");
    assert_eq!(sanitize_filename("  ..  "), "unnamed");
    assert_eq!(sanitize_filename("plain.zip"), "plain.zip");
}

#[test]
fn test_title_from_filename() {
    assert_eq!(title_from_filename("low-poly_shooter.zip"), "Low Poly Shooter");
    assert_eq!(title_from_filename("UI-Components-Pack.psd"), "UI Components Pack");
}

#[test]
fn test_token_is_deterministic_and_short() {
    let a = token_for(&["mirror", "a.zip"]);
    assert_eq!(a, token_for(&["mirror", "a.zip"]));
    assert_ne!(a, token_for(&["mirror", "b.zip"]));
    // Part boundaries matter.
    assert_ne!(token_for(&["ab", "c"]), token_for(&["a", "bc"]));
    assert_eq!(a.len(), 16);
}

// --- content normalization ---

#[test]
fn test_normalize_fills_absent_fields() {
    let d = descriptor("cool-pack.zip");
    let mut record = ContentRecord {
        description: "x".repeat(400),
        ..ContentRecord::default()
    };
    record.normalize(&d);
    assert_eq!(record.title, "Cool Pack");
    assert_eq!(record.alt_title, "Cool Pack");
    assert_eq!(record.meta_description.chars().count(), META_DESCRIPTION_CHARS);
    assert_eq!(record.tags, vec!["archives".to_string()]);
    assert_eq!(record.difficulty, "intermediate");
    assert_eq!(record.category_label, Category::Archives.display_name());
}

#[test]
fn test_normalize_keeps_present_fields() {
    let d = descriptor("cool-pack.zip");
    let mut record = ContentRecord {
        title: "Given".to_string(),
        tags: vec!["t".to_string()],
        difficulty: "beginner".to_string(),
        ..ContentRecord::default()
    };
    record.normalize(&d);
    assert_eq!(record.title, "Given");
    assert_eq!(record.tags, vec!["t".to_string()]);
    assert_eq!(record.difficulty, "beginner");
}

#[test]
fn test_category_slug_round_trip() {
    for c in Category::ALL {
        assert_eq!(Category::from_slug(c.as_str()), c);
    }
    assert_eq!(Category::from_slug("nope"), Category::Unknown);
    assert_eq!(Category::Models3d.to_string(), "3d-models");
}

// --- simulation ---

#[test]
fn test_simulated_listing_has_five_fixed_entries() {
    let listing = simulated_listing("/incoming/");
    assert_eq!(listing.len(), 5);
    assert_eq!(listing[0].path, "/incoming/LowPolyShooterPack.unitypackage");
    assert_eq!(listing[0].category, Category::UnityAssets);
    assert_eq!(listing, simulated_listing("/incoming"));
}

#[test]
fn test_template_content_is_complete() {
    let d = descriptor("LowPolyShooterPack.unitypackage");
    let content = template_content(&d);
    assert!(content.title.starts_with("LowPolyShooterPack - "));
    assert!(content.description.contains("shooter"));
    assert!(content.tags.iter().any(|t| t == "unity-assets"));
    assert!(content.tags.iter().any(|t| t == "FPS"));
    assert!(content.tags.len() <= 10);
    assert!(!content.requirements.is_empty());
    assert!(!content.features.is_empty());
    assert_eq!(content, template_content(&d));
}

#[test]
fn test_simulated_urls_are_deterministic() {
    let a = simulated_hosting_url("Mirror", "a.zip");
    assert_eq!(a, simulated_hosting_url("Mirror", "a.zip"));
    assert!(a.starts_with("https://mirror.simulated.invalid/"));
    assert!(a.ends_with("/a.zip"));

    assert_eq!(
        simulated_object_url(Some("https://cdn.test/"), "/images/x.png"),
        "https://cdn.test/images/x.png"
    );
    assert!(simulated_object_url(None, "k").starts_with("https://objects.simulated.invalid/"));
}

#[test]
fn test_simulated_catalog_id_ignores_clock() {
    let d = descriptor("a.zip");
    let content = template_content(&d);
    let record = reslibs_ingest::CatalogRecord {
        title: content.title,
        alt_title: content.alt_title,
        description: content.description,
        meta_description: content.meta_description,
        category: d.category,
        file_size: d.size,
        file_format: d.file_type.clone(),
        checksum: String::new(),
        source_path: d.path.clone(),
        download_links: Vec::new(),
        image_urls: Vec::new(),
        tags: content.tags,
        status: "published".to_string(),
        created_at: 1_700_000_000,
        simulated_stages: Vec::new(),
    };
    let id = simulated_catalog_id(&record);
    assert!(id >= 1);
    assert_eq!(id, simulated_catalog_id(&record));

    let later = reslibs_ingest::CatalogRecord {
        created_at: record.created_at + 3600,
        ..record.clone()
    };
    assert_eq!(simulated_catalog_id(&later), id);

    let other_bytes = reslibs_ingest::CatalogRecord {
        checksum: "ab".repeat(32),
        ..record
    };
    assert_ne!(simulated_catalog_id(&other_bytes), id);
}
