use reslibs_ingest::collaborators::{
    DirectoryLister, DirectoryObjectStore, LocalAcquirer, MediaLibrary, MirrorPlatform,
    SidecarEnricher, SqliteCatalog,
};
use reslibs_ingest::engine::{detect_category, detect_file_type, hash_file_hex, token_for};
use reslibs_ingest::pipeline::FileMetadata;
use reslibs_ingest::ports::{
    Acquirer, Collaborator, Enricher, HostingPlatform, Lister, MediaQuery, MediaSource,
    ObjectStore,
};
use reslibs_ingest::utils::settings::{CatalogBackend, PlatformSettings, Settings};
use reslibs_ingest::{Category, PortError, ResourceDescriptor, ingest};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

fn descriptor(path: &str) -> ResourceDescriptor {
    let name = Path::new(path).file_name().unwrap().to_string_lossy().to_string();
    ResourceDescriptor {
        path: path.to_string(),
        size: 0,
        modified_secs: 0,
        file_type: detect_file_type(&name),
        category: detect_category(&name),
        name,
    }
}

// --- lister ---

#[test]
fn test_lister_lists_sorted_and_skips_sidecars() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(&root.join("incoming/b.zip"), "bb");
    write(&root.join("incoming/a.psd"), "a");
    write(&root.join("incoming/a.psd.meta.json"), "{}");
    write(&root.join("incoming/.DS_Store"), "");
    write(&root.join("incoming/nested/c.zip"), "c");

    let lister = DirectoryLister::new(Some(root.to_path_buf())).skipping_suffix(".meta.json");
    let flat = lister.list("/incoming", false).unwrap();
    let paths: Vec<&str> = flat.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["incoming/a.psd", "incoming/b.zip"]);
    assert_eq!(flat[0].category, Category::DesignAssets);
    assert_eq!(flat[1].size, 2);

    let deep = lister.list("incoming", true).unwrap();
    assert_eq!(deep.len(), 3);
    assert_eq!(deep[2].path, "incoming/nested/c.zip");
}

#[test]
fn test_lister_errors() {
    let tmp = TempDir::new().unwrap();
    let unset = DirectoryLister::new(None);
    assert!(!unset.is_configured());
    assert!(unset.list("/x", false).unwrap_err().is_not_configured());

    let lister = DirectoryLister::new(Some(tmp.path().to_path_buf()));
    assert!(matches!(lister.list("/nope", false), Err(PortError::Unavailable { .. })));
    assert!(matches!(lister.list("../etc", false), Err(PortError::Validation(_))));
}

// --- acquirer ---

#[test]
fn test_acquirer_copies_into_download_dir() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src");
    write(&root.join("incoming/a.zip"), "payload");
    let acquirer = LocalAcquirer::new(Some(root));

    let dest = tmp.path().join("downloads");
    let local = acquirer.fetch(&descriptor("/incoming/a.zip"), &dest).unwrap();
    assert_eq!(local, dest.join("a.zip"));
    assert_eq!(fs::read_to_string(&local).unwrap(), "payload");

    let missing = acquirer.fetch(&descriptor("/incoming/gone.zip"), &dest);
    assert!(matches!(missing, Err(PortError::NotFound { .. })));
}

// --- enricher ---

#[test]
fn test_sidecar_enricher_reads_and_normalizes() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    write(
        &root.join("incoming/tool.exe.meta.json"),
        r#"{"title": "Great Tool", "tags": ["tool"]}"#,
    );
    let enricher = SidecarEnricher::new(Some(root.clone()), ".meta.json");
    let d = descriptor("incoming/tool.exe");
    let meta = FileMetadata::from_descriptor(&d);

    let content = enricher.generate(&d, &meta, Path::new("/unused")).unwrap();
    assert_eq!(content.title, "Great Tool");
    assert_eq!(content.tags, vec!["tool".to_string()]);
    assert_eq!(content.requirements, vec!["Windows operating system".to_string()]);
    assert!(!content.description.is_empty());

    let missing = enricher.generate(&descriptor("incoming/other.exe"), &meta, Path::new("/unused"));
    assert!(matches!(missing, Err(PortError::Generation(_))));
}

#[test]
fn test_sidecar_enricher_rejects_malformed_json() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("a.zip.meta.json"), "{ not json");
    let enricher = SidecarEnricher::new(Some(tmp.path().to_path_buf()), ".meta.json");
    let d = descriptor("a.zip");
    let err = enricher
        .generate(&d, &FileMetadata::from_descriptor(&d), Path::new("/unused"))
        .unwrap_err();
    assert!(err.is_degradable());
}

// --- media ---

#[test]
fn test_media_library_prefers_relevant_images() {
    let tmp = TempDir::new().unwrap();
    let lib = tmp.path().join("lib");
    write(&lib.join("aaa_generic.png"), "1");
    write(&lib.join("shooter_cover.jpg"), "2");
    write(&lib.join("notes.txt"), "not an image");
    let media = MediaLibrary::new(Some(lib));
    let query = MediaQuery {
        title: "Shooter Pack".to_string(),
        description: String::new(),
        tags: vec![],
        category: Category::UnityAssets,
    };

    let dest = tmp.path().join("images");
    let found = media.find(&query, 5, &dest).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found[0].to_string_lossy().ends_with("_shooter_cover.jpg"));
    assert!(found.iter().all(|p| p.starts_with(&dest) && p.exists()));

    assert_eq!(media.find(&query, 1, &dest).unwrap().len(), 1);
    assert!(media.find(&query, 0, &dest).unwrap().is_empty());
}

#[test]
fn test_media_copy_failure_removes_partial_copies() {
    let tmp = TempDir::new().unwrap();
    let lib = tmp.path().join("lib");
    write(&lib.join("a.png"), "1");
    write(&lib.join("b.png"), "2");
    let media = MediaLibrary::new(Some(lib));
    let query = MediaQuery {
        title: "Pack".to_string(),
        description: String::new(),
        tags: vec![],
        category: Category::Archives,
    };

    // A directory where the second copy should land makes that copy fail.
    let dest = tmp.path().join("images");
    let prefix = token_for(&["Pack", "archives"]);
    fs::create_dir_all(dest.join(format!("{}_b.png", prefix))).unwrap();

    let err = media.find(&query, 5, &dest).unwrap_err();
    assert!(matches!(err, PortError::Transfer { .. }));
    assert!(!dest.join(format!("{}_a.png", prefix)).exists());
}

// --- object store and hosting ---

#[test]
fn test_object_store_writes_object_and_metadata() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("x.png");
    write(&file, "png");
    let store = DirectoryObjectStore::new(
        Some(tmp.path().join("objects")),
        Some("https://cdn.test/".to_string()),
    );
    assert!(store.is_configured());

    let meta = BTreeMap::from([("resource".to_string(), "a.zip".to_string())]);
    let url = store.put(&file, "images/archives/x.png", "image/png", &meta).unwrap();
    assert_eq!(url, "https://cdn.test/images/archives/x.png");
    assert!(tmp.path().join("objects/images/archives/x.png").exists());
    let sidecar = fs::read_to_string(tmp.path().join("objects/images/archives/x.png.meta.json")).unwrap();
    assert!(sidecar.contains("image/png"));

    assert!(!DirectoryObjectStore::new(Some(tmp.path().to_path_buf()), None).is_configured());
}

#[test]
fn test_mirror_platform_uses_content_token() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("a.zip");
    write(&file, "zip");
    let mirror = MirrorPlatform::new(
        "mirror",
        Some(tmp.path().join("served")),
        Some("https://mirror.test".to_string()),
    );

    let url = mirror.put(&file, "a.zip").unwrap();
    let hex = hash_file_hex(&file).unwrap();
    let token = &hex[..16];
    assert_eq!(url, format!("https://mirror.test/{}/a.zip", token));
    assert!(tmp.path().join("served").join(token).join("a.zip").exists());
    assert_eq!(mirror.put(&file, "a.zip").unwrap(), url);

    let unset = MirrorPlatform::new("bare", None, Some("https://x".to_string()));
    assert!(!unset.is_configured());
    assert!(unset.put(&file, "a.zip").unwrap_err().is_not_configured());
}

// --- end to end ---

fn local_settings(tmp: &TempDir) -> Settings {
    let root = tmp.path().join("source");
    write(&root.join("incoming/Alpha-Pack.zip"), "alpha bytes");
    write(&root.join("incoming/Alpha-Pack.zip.meta.json"), r#"{"title": "Alpha Pack"}"#);
    write(&root.join("incoming/beta.psd"), "beta bytes");
    write(&root.join("incoming/beta.psd.meta.json"), r#"{"title": "Beta Kit"}"#);
    write(&tmp.path().join("library/alpha_cover.png"), "png");

    let mut s = Settings::default();
    s.source.path = "/incoming".to_string();
    s.source.root = Some(root);
    s.download.dir = tmp.path().join("downloads");
    s.media.download_dir = tmp.path().join("images");
    s.media.library_dir = Some(tmp.path().join("library"));
    s.object_store.dir = Some(tmp.path().join("objects"));
    s.object_store.public_base_url = Some("https://cdn.test".to_string());
    s.hosting.platforms = vec![PlatformSettings {
        name: "mirror".to_string(),
        dir: Some(tmp.path().join("mirror")),
        base_url: Some("https://mirror.test".to_string()),
    }];
    s.catalog.path = tmp.path().join("data/catalog.db");
    s.system.pause_between_items_secs = 0;
    s.system.disk_space_threshold = "0B".to_string();
    s
}

#[test]
fn test_ingest_local_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let settings = local_settings(&tmp);
    let summary = ingest(&settings, 5, None).unwrap();

    assert_eq!(summary.listed, 2);
    assert_eq!(summary.succeeded, 2, "{}", summary.report());
    assert!(summary.outcomes.iter().all(|o| o.simulated.is_empty()));

    let catalog = SqliteCatalog::open(&settings.catalog.path).unwrap();
    assert_eq!(catalog.count().unwrap(), 2);
    let alpha = catalog.find_by_title("Alpha Pack").unwrap().unwrap().record;
    assert_eq!(alpha.source_path, "incoming/Alpha-Pack.zip");
    assert_eq!(alpha.download_links.len(), 1);
    assert!(alpha.download_links[0].url.starts_with("https://mirror.test/"));
    assert_eq!(alpha.image_urls.len(), 1);

    // Local artifacts are gone; published copies remain.
    assert_eq!(fs::read_dir(tmp.path().join("downloads")).unwrap().count(), 0);
    assert!(tmp.path().join("objects/images").exists());
}

#[test]
fn test_ingest_dry_run_touches_no_catalog() {
    let tmp = TempDir::new().unwrap();
    let mut settings = local_settings(&tmp);
    settings.system.dry_run = true;
    let summary = ingest(&settings, 2, None).unwrap();

    assert_eq!(summary.listed, 5);
    assert_eq!(summary.succeeded, 2);
    assert!(!settings.catalog.path.exists());
    assert!(!tmp.path().join("mirror").exists());
}

#[test]
fn test_ingest_memory_backend_and_invalid_settings() {
    let tmp = TempDir::new().unwrap();
    let mut settings = local_settings(&tmp);
    settings.catalog.backend = CatalogBackend::Memory;
    assert_eq!(ingest(&settings, 1, None).unwrap().succeeded, 1);
    assert!(!settings.catalog.path.exists());

    settings.source.path = String::new();
    assert!(ingest(&settings, 1, None).is_err());
}
