//! Five-stage processing of a single resource.
//!
//! Acquire -> Enrich -> SourceMedia -> Replicate -> Persist, strictly in order. A failed stage
//! skips the rest; SourceMedia never fails. Local artifacts are removed on every exit path.

use anyhow::Result;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::tools::{content_type_for, format_size, now_secs, parse_size, sanitize_filename};
use crate::error::PortError;
use crate::pipeline::fanout::UploadFanout;
use crate::pipeline::metadata::extract_metadata;
use crate::pipeline::state::{ResourcePhase, ResourceState};
use crate::ports::simulate::{
    simulated_catalog_id, simulated_object_url, template_content, write_placeholder_artifact,
    write_placeholder_media,
};
use crate::ports::{MediaQuery, PortSet};
use crate::types::{CatalogId, CatalogRecord, HostingLink, ResourceDescriptor};
use crate::utils::config::PUBLISHED_STATUS;
use crate::utils::settings::Settings;

/// Why a stage aborted its resource.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{stage} failed ({kind}): {reason}")]
pub struct StageFailure {
    pub stage: ResourcePhase,
    /// [`PortError::kind`] of the underlying error.
    pub kind: &'static str,
    pub reason: String,
}

impl StageFailure {
    pub fn new(stage: ResourcePhase, error: &PortError) -> Self {
        Self {
            stage,
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// Outcome of one stage.
pub type StageResult<T> = std::result::Result<T, StageFailure>;

/// Paths and limits the stages need.
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    pub download_dir: PathBuf,
    pub media_download_dir: PathBuf,
    pub media_per_resource: usize,
    /// Resources larger than this are rejected before acquisition.
    pub max_file_size: u64,
    /// Base for simulated object URLs.
    pub public_base_url: Option<String>,
}

impl ProcessorConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            download_dir: settings.download.dir.clone(),
            media_download_dir: settings.media.download_dir.clone(),
            media_per_resource: settings.media.per_resource,
            max_file_size: parse_size(&settings.download.max_file_size)?,
            public_base_url: settings.object_store.public_base_url.clone(),
        })
    }
}

/// Terminal result for one resource.
#[derive(Clone, Debug)]
pub struct ResourceOutcome {
    pub name: String,
    /// `Completed` or `Aborted`.
    pub phase: ResourcePhase,
    /// Every phase entered, in order, ending with the terminal one.
    pub trace: Vec<ResourcePhase>,
    pub catalog_id: Option<CatalogId>,
    pub failure: Option<StageFailure>,
    pub hosting_links: Vec<HostingLink>,
    pub media_urls: Vec<String>,
    /// Labels of simulated results.
    pub simulated: Vec<String>,
}

impl ResourceOutcome {
    pub fn is_success(&self) -> bool {
        self.phase == ResourcePhase::Completed
    }

    pub fn reached(&self, phase: ResourcePhase) -> bool {
        self.trace.contains(&phase)
    }
}

/// Runs the stage sequence against a [`PortSet`].
pub struct ResourceProcessor {
    ports: PortSet,
    config: ProcessorConfig,
}

impl ResourceProcessor {
    pub fn new(ports: PortSet, config: ProcessorConfig) -> Self {
        Self { ports, config }
    }

    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process one descriptor to a terminal phase. Never returns an error: failures become
    /// the outcome's [`StageFailure`].
    pub fn process(&self, descriptor: &ResourceDescriptor) -> ResourceOutcome {
        info!("processing {} ({})", descriptor.name, format_size(descriptor.size));
        let mut state = ResourceState::new();
        let mut trace = vec![ResourcePhase::Created];

        let result = self.run_stages(descriptor, &mut state, &mut trace);
        let phase = match &result {
            Ok(()) => ResourcePhase::Completed,
            Err(failure) => {
                error!("{}: {}", descriptor.name, failure);
                ResourcePhase::Aborted
            }
        };
        trace.push(phase);
        self.cleanup(&state);

        if !state.simulated.is_empty() {
            debug!("{}: simulated {:?}", descriptor.name, state.simulated);
        }
        ResourceOutcome {
            name: descriptor.name.clone(),
            phase,
            trace,
            catalog_id: state.catalog_id,
            failure: result.err(),
            hosting_links: state.hosting_links,
            media_urls: state.media_urls,
            simulated: state.simulated,
        }
    }

    fn run_stages(
        &self,
        descriptor: &ResourceDescriptor,
        state: &mut ResourceState,
        trace: &mut Vec<ResourcePhase>,
    ) -> StageResult<()> {
        trace.push(ResourcePhase::Acquiring);
        self.acquire(descriptor, state)?;

        trace.push(ResourcePhase::Enriching);
        self.enrich(descriptor, state)?;

        trace.push(ResourcePhase::SourcingMedia);
        self.source_media(descriptor, state);

        trace.push(ResourcePhase::Replicating);
        self.replicate(descriptor, state)?;

        trace.push(ResourcePhase::Persisting);
        self.persist(descriptor, state)
    }

    fn acquire(&self, descriptor: &ResourceDescriptor, state: &mut ResourceState) -> StageResult<()> {
        let stage = ResourcePhase::Acquiring;
        if descriptor.size > self.config.max_file_size {
            let err = PortError::Validation(format!(
                "{} is {} (limit {})",
                descriptor.name,
                format_size(descriptor.size),
                format_size(self.config.max_file_size)
            ));
            return Err(StageFailure::new(stage, &err));
        }

        let dir = self.config.download_dir.clone();
        let owned = descriptor.clone();
        let degraded = self
            .ports
            .acquirer
            .invoke_with_discard(
                move |a| a.fetch(&owned, &dir),
                || write_placeholder_artifact(descriptor, &self.config.download_dir),
                |late: PathBuf| remove_artifact(&late),
            )
            .map_err(|e| StageFailure::new(stage, &e))?;

        if degraded.is_simulated() {
            state.mark_simulated(stage.stage_label());
        }
        debug!("acquired {}", degraded.value.display());
        state.local_path = Some(degraded.value);
        Ok(())
    }

    fn enrich(&self, descriptor: &ResourceDescriptor, state: &mut ResourceState) -> StageResult<()> {
        let stage = ResourcePhase::Enriching;
        let local = local_path(state, stage)?;
        let metadata = extract_metadata(descriptor, &local);

        let owned = descriptor.clone();
        let meta = metadata.clone();
        let degraded = self
            .ports
            .enricher
            .invoke(
                move |e| e.generate(&owned, &meta, &local),
                || Ok(template_content(descriptor)),
            )
            .map_err(|e| StageFailure::new(stage, &e))?;

        if degraded.is_simulated() {
            state.mark_simulated(stage.stage_label());
        }
        let mut content = degraded.value;
        content.normalize(descriptor);
        info!("content: {}", content.title);
        state.metadata = Some(metadata);
        state.content = Some(content);
        Ok(())
    }

    /// Never fails: a media failure or an empty result leaves `media_urls` empty.
    fn source_media(&self, descriptor: &ResourceDescriptor, state: &mut ResourceState) {
        let stage = ResourcePhase::SourcingMedia;
        let Some(content) = state.content.as_ref() else {
            return;
        };
        let query = MediaQuery {
            title: content.title.clone(),
            description: content.description.clone(),
            tags: content.tags.clone(),
            category: descriptor.category,
        };
        let max = self.config.media_per_resource;
        let dir = self.config.media_download_dir.clone();
        let owned_query = query.clone();

        let found = match self.ports.media.invoke_with_discard(
            move |m| m.find(&owned_query, max, &dir),
            || write_placeholder_media(&query, max, &self.config.media_download_dir),
            |late: Vec<PathBuf>| late.iter().for_each(|p| remove_artifact(p)),
        ) {
            Ok(found) => found,
            Err(e) => {
                warn!("{}: no media ({}), continuing", descriptor.name, e);
                return;
            }
        };
        if found.is_simulated() {
            state.mark_simulated(stage.stage_label());
        }
        state.media_files = found.value.clone();
        if found.value.is_empty() {
            info!("{}: no media found, continuing", descriptor.name);
            return;
        }

        for file in &found.value {
            if let Some(url) = self.upload_media(descriptor, file, state) {
                state.media_urls.push(url);
            }
        }
        info!(
            "{}: {}/{} media uploaded",
            descriptor.name,
            state.media_urls.len(),
            found.value.len()
        );
    }

    fn upload_media(
        &self,
        descriptor: &ResourceDescriptor,
        file: &Path,
        state: &mut ResourceState,
    ) -> Option<String> {
        let file_name = file
            .file_name()
            .map(|n| sanitize_filename(&n.to_string_lossy()))
            .unwrap_or_else(|| "image".to_string());
        let key = format!("images/{}/{}", descriptor.category, file_name);
        let content_type = content_type_for(file).to_string();
        let metadata = BTreeMap::from([
            ("resource".to_string(), descriptor.name.clone()),
            ("category".to_string(), descriptor.category.to_string()),
        ]);

        let path = file.to_path_buf();
        let put_key = key.clone();
        match self.ports.object_store.invoke(
            move |s| s.put(&path, &put_key, &content_type, &metadata),
            || Ok(simulated_object_url(self.config.public_base_url.as_deref(), &key)),
        ) {
            Ok(url) => {
                if url.is_simulated() {
                    state.mark_simulated(self.ports.object_store.label());
                }
                Some(url.value)
            }
            Err(e) => {
                warn!("skipping {}: {}", file.display(), e);
                None
            }
        }
    }

    fn replicate(&self, descriptor: &ResourceDescriptor, state: &mut ResourceState) -> StageResult<()> {
        let stage = ResourcePhase::Replicating;
        let local = local_path(state, stage)?;
        if !local.exists() {
            let err = PortError::Validation(format!(
                "local artifact {} no longer exists",
                local.display()
            ));
            return Err(StageFailure::new(stage, &err));
        }

        let filename = sanitize_filename(&descriptor.name);
        let report = UploadFanout::new(&self.ports.hosting).run(&local, &filename);
        for platform in &report.simulated {
            state.mark_simulated(&format!("hosting:{}", platform));
        }
        if !report.is_success() {
            let detail = report
                .failures
                .iter()
                .map(|(p, r)| format!("{}: {}", p, r))
                .collect::<Vec<_>>()
                .join("; ");
            let err = PortError::Upload {
                target: format!("all {} hosting platforms", report.attempted),
                detail,
            };
            return Err(StageFailure::new(stage, &err));
        }
        info!(
            "{}: replicated to {}/{} platforms",
            descriptor.name,
            report.links.len(),
            report.attempted
        );
        state.hosting_links = report.hosting_links();
        Ok(())
    }

    fn persist(&self, descriptor: &ResourceDescriptor, state: &mut ResourceState) -> StageResult<()> {
        let stage = ResourcePhase::Persisting;
        let record = self.build_record(descriptor, state);

        let owned = record.clone();
        let degraded = self
            .ports
            .catalog
            .invoke(move |c| c.create(&owned), || Ok(simulated_catalog_id(&record)))
            .map_err(|e| StageFailure::new(stage, &e))?;

        if degraded.is_simulated() {
            state.mark_simulated(stage.stage_label());
        }
        info!("{}: cataloged as #{}", descriptor.name, degraded.value);
        state.catalog_id = Some(degraded.value);
        Ok(())
    }

    fn build_record(&self, descriptor: &ResourceDescriptor, state: &ResourceState) -> CatalogRecord {
        let content = state.content.clone().unwrap_or_else(|| template_content(descriptor));
        let (file_size, checksum) = state
            .metadata
            .as_ref()
            .map(|m| (m.size, m.checksum.clone()))
            .unwrap_or((descriptor.size, String::new()));
        // Stages before Persist. A stored record was persisted for real; a simulated persist
        // only shows up in the outcome.
        let simulated = state.simulated.clone();
        CatalogRecord {
            title: content.title,
            alt_title: content.alt_title,
            description: content.description,
            meta_description: content.meta_description,
            category: descriptor.category,
            file_size,
            file_format: descriptor.file_type.clone(),
            checksum,
            source_path: descriptor.path.clone(),
            download_links: state.hosting_links.clone(),
            image_urls: state.media_urls.clone(),
            tags: content.tags,
            status: PUBLISHED_STATUS.to_string(),
            created_at: now_secs(),
            simulated_stages: simulated,
        }
    }

    /// Delete every local artifact. Failures are logged, never returned.
    fn cleanup(&self, state: &ResourceState) {
        for path in state.local_artifacts() {
            remove_artifact(&path);
        }
    }
}

/// Remove one local file. Already gone is fine; other failures are logged.
fn remove_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("cleanup: removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("cleanup: could not remove {}: {}", path.display(), e),
    }
}

fn local_path(state: &ResourceState, stage: ResourcePhase) -> StageResult<PathBuf> {
    state.local_path.clone().ok_or_else(|| {
        StageFailure::new(
            stage,
            &PortError::Validation("no local artifact from acquisition".to_string()),
        )
    })
}
