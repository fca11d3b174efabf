//! Shared fakes for integration tests: counting collaborators with scripted failures.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reslibs_ingest::engine::tools::{detect_category, detect_file_type};
use reslibs_ingest::pipeline::{FileMetadata, ProcessorConfig, ResourceProcessor};
use reslibs_ingest::ports::{
    Acquirer, CatalogStore, Collaborator, Enricher, HostingPlatform, Lister, MediaQuery,
    MediaSource, ObjectStore, PortSet,
};
use reslibs_ingest::{
    CatalogId, CatalogRecord, ContentRecord, PortError, ResourceDescriptor, RunMode,
};

pub fn descriptor(name: &str, size: u64) -> ResourceDescriptor {
    ResourceDescriptor {
        path: format!("/incoming/{}", name),
        name: name.to_string(),
        size,
        modified_secs: 1_700_000_000,
        file_type: detect_file_type(name),
        category: detect_category(name),
    }
}

pub fn config(root: &Path) -> ProcessorConfig {
    ProcessorConfig {
        download_dir: root.join("downloads"),
        media_download_dir: root.join("images"),
        media_per_resource: 3,
        max_file_size: 10 * 1024 * 1024 * 1024,
        public_base_url: Some("https://cdn.test".to_string()),
    }
}

/// Number of files (recursively) under `dir`; 0 when it does not exist.
pub fn file_count(dir: &Path) -> usize {
    walkdir_count(dir)
}

fn walkdir_count(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| {
            let p = e.path();
            if p.is_dir() { walkdir_count(&p) } else { 1 }
        })
        .sum()
}

#[derive(Default)]
pub struct Calls(AtomicUsize);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

// ---- Lister ----

pub struct FakeLister {
    pub items: Vec<ResourceDescriptor>,
    pub error: Option<fn() -> PortError>,
    pub calls: Calls,
}

impl FakeLister {
    pub fn new(names: &[&str]) -> Self {
        Self {
            items: names.iter().map(|n| descriptor(n, 1024)).collect(),
            error: None,
            calls: Calls::default(),
        }
    }
}

impl Collaborator for FakeLister {
    fn name(&self) -> &str {
        "fake-lister"
    }
}

impl Lister for FakeLister {
    fn list(&self, _path: &str, _recursive: bool) -> Result<Vec<ResourceDescriptor>, PortError> {
        self.calls.hit();
        match self.error {
            Some(make) => Err(make()),
            None => Ok(self.items.clone()),
        }
    }
}

// ---- Acquirer ----

/// Writes a small file into the download dir; names in `fail_for` fail with NotFound.
/// With `delay`, sleeps before writing.
#[derive(Default)]
pub struct FakeAcquirer {
    pub fail_for: HashSet<String>,
    pub delay: Option<Duration>,
    pub calls: Calls,
}

impl Collaborator for FakeAcquirer {
    fn name(&self) -> &str {
        "fake-acquirer"
    }
}

impl Acquirer for FakeAcquirer {
    fn fetch(&self, d: &ResourceDescriptor, dest_dir: &Path) -> Result<PathBuf, PortError> {
        self.calls.hit();
        if self.fail_for.contains(&d.name) {
            return Err(PortError::NotFound {
                path: d.path.clone(),
            });
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        fs::create_dir_all(dest_dir).unwrap();
        let path = dest_dir.join(&d.name);
        fs::write(&path, format!("bytes of {}", d.name)).unwrap();
        Ok(path)
    }
}

// ---- Enricher ----

/// Returns a fixed title; names in `fail_for` fail with a non-degradable Validation error.
#[derive(Default)]
pub struct FakeEnricher {
    pub fail_for: HashSet<String>,
    pub calls: Calls,
}

impl Collaborator for FakeEnricher {
    fn name(&self) -> &str {
        "fake-enricher"
    }
}

impl Enricher for FakeEnricher {
    fn generate(
        &self,
        d: &ResourceDescriptor,
        _metadata: &FileMetadata,
        local_path: &Path,
    ) -> Result<ContentRecord, PortError> {
        self.calls.hit();
        assert!(local_path.exists(), "enricher got a missing local path");
        if self.fail_for.contains(&d.name) {
            return Err(PortError::Validation(format!("cannot describe {}", d.name)));
        }
        Ok(ContentRecord {
            title: format!("Title of {}", d.name),
            description: "A described resource.".to_string(),
            tags: vec!["tag".to_string()],
            ..ContentRecord::default()
        })
    }
}

// ---- Media ----

/// Writes `count` image files into the destination dir, after `delay` when set.
#[derive(Default)]
pub struct FakeMedia {
    pub count: usize,
    pub delay: Option<Duration>,
    pub calls: Calls,
}

impl Collaborator for FakeMedia {
    fn name(&self) -> &str {
        "fake-media"
    }
}

impl MediaSource for FakeMedia {
    fn find(&self, _q: &MediaQuery, max: usize, dest: &Path) -> Result<Vec<PathBuf>, PortError> {
        self.calls.hit();
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        fs::create_dir_all(dest).unwrap();
        Ok((0..self.count.min(max))
            .map(|i| {
                let p = dest.join(format!("img_{}.png", i));
                fs::write(&p, b"png").unwrap();
                p
            })
            .collect())
    }
}

// ---- Object store ----

#[derive(Default)]
pub struct FakeObjectStore {
    pub fail: bool,
    pub calls: Calls,
}

impl Collaborator for FakeObjectStore {
    fn name(&self) -> &str {
        "fake-object-store"
    }
}

impl ObjectStore for FakeObjectStore {
    fn put(
        &self,
        _local: &Path,
        key: &str,
        _content_type: &str,
        _metadata: &BTreeMap<String, String>,
    ) -> Result<String, PortError> {
        self.calls.hit();
        if self.fail {
            return Err(PortError::Validation("rejected".to_string()));
        }
        Ok(format!("https://objects.test/{}", key))
    }
}

// ---- Hosting ----

pub struct FakePlatform {
    pub name: String,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub calls: Calls,
}

impl FakePlatform {
    pub fn ok(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            delay: None,
            calls: Calls::default(),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::ok(name)
        }
    }
}

impl Collaborator for FakePlatform {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HostingPlatform for FakePlatform {
    fn put(&self, local: &Path, filename: &str) -> Result<String, PortError> {
        self.calls.hit();
        if let Some(d) = self.delay {
            std::thread::sleep(d);
        }
        assert!(local.exists());
        if self.fail {
            return Err(PortError::Upload {
                target: self.name.clone(),
                detail: "server said no".to_string(),
            });
        }
        Ok(format!("https://{}.test/{}", self.name, filename))
    }
}

// ---- Catalog ----

#[derive(Default)]
pub struct FailingCatalog {
    pub calls: Calls,
}

impl Collaborator for FailingCatalog {
    fn name(&self) -> &str {
        "failing-catalog"
    }
}

impl CatalogStore for FailingCatalog {
    fn create(&self, _record: &CatalogRecord) -> Result<CatalogId, PortError> {
        self.calls.hit();
        Err(PortError::Persistence("disk full".to_string()))
    }
}

// ---- Wiring ----

/// Fakes installed in a live port set, kept so tests can inspect call counts.
pub struct Fakes {
    pub lister: Arc<FakeLister>,
    pub acquirer: Arc<FakeAcquirer>,
    pub enricher: Arc<FakeEnricher>,
    pub media: Arc<FakeMedia>,
    pub object_store: Arc<FakeObjectStore>,
    pub catalog: Arc<reslibs_ingest::collaborators::MemoryCatalog>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            lister: Arc::new(FakeLister::new(&["a.zip", "b.zip", "c.zip", "d.zip", "e.zip"])),
            acquirer: Arc::new(FakeAcquirer::default()),
            enricher: Arc::new(FakeEnricher::default()),
            media: Arc::new(FakeMedia {
                count: 2,
                ..FakeMedia::default()
            }),
            object_store: Arc::new(FakeObjectStore::default()),
            catalog: Arc::new(reslibs_ingest::collaborators::MemoryCatalog::new()),
        }
    }
}

impl Fakes {
    pub fn ports(&self) -> PortSet {
        PortSet::unconfigured(RunMode::Live)
            .with_lister(self.lister.clone())
            .with_acquirer(self.acquirer.clone())
            .with_enricher(self.enricher.clone())
            .with_media(self.media.clone())
            .with_object_store(self.object_store.clone())
            .with_catalog(self.catalog.clone())
    }

    pub fn processor(&self, root: &Path) -> ResourceProcessor {
        ResourceProcessor::new(self.ports(), config(root))
    }
}
