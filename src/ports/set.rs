//! The full set of ports a batch runs against, built once and passed down.

use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

use super::{
    Acquirer, CatalogStore, Collaborator, DegradablePort, Enricher, Fallback, HostingPlatform, Lister,
    MediaSource, ObjectStore,
};
use crate::collaborators::{
    DirectoryLister, DirectoryObjectStore, LocalAcquirer, MediaLibrary, MirrorPlatform,
    SidecarEnricher, open_catalog,
};
use crate::types::RunMode;
use crate::utils::settings::Settings;

/// Slot labels used in logs and provenance.
pub struct PortLabels;

impl PortLabels {
    pub const LISTING: &'static str = "listing";
    pub const ACQUISITION: &'static str = "acquisition";
    pub const ENRICHMENT: &'static str = "enrichment";
    pub const MEDIA: &'static str = "media";
    pub const OBJECT_STORE: &'static str = "object-store";
    pub const CATALOG: &'static str = "catalog";
}

/// Every port the pipeline uses. Caller owns the lifecycle.
pub struct PortSet {
    pub lister: DegradablePort<dyn Lister>,
    pub acquirer: DegradablePort<dyn Acquirer>,
    pub enricher: DegradablePort<dyn Enricher>,
    pub media: DegradablePort<dyn MediaSource>,
    pub object_store: DegradablePort<dyn ObjectStore>,
    /// One port per hosting platform, labelled with the platform name.
    pub hosting: Vec<DegradablePort<dyn HostingPlatform>>,
    pub catalog: DegradablePort<dyn CatalogStore>,
    mode: RunMode,
    timeout: Option<Duration>,
}

impl PortSet {
    /// Ports with no collaborators installed: every call simulates and there are no platforms.
    pub fn unconfigured(mode: RunMode) -> Self {
        Self {
            lister: DegradablePort::unconfigured(PortLabels::LISTING, mode),
            acquirer: DegradablePort::unconfigured(PortLabels::ACQUISITION, mode),
            enricher: DegradablePort::unconfigured(PortLabels::ENRICHMENT, mode),
            media: DegradablePort::unconfigured(PortLabels::MEDIA, mode),
            object_store: DegradablePort::unconfigured(PortLabels::OBJECT_STORE, mode),
            hosting: Vec::new(),
            catalog: DegradablePort::unconfigured(PortLabels::CATALOG, mode)
                .with_fallback(Fallback::Surface),
            mode,
            timeout: None,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Apply a per-invocation timeout to every port, including ones added later.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self.lister = self.lister.with_timeout(timeout);
        self.acquirer = self.acquirer.with_timeout(timeout);
        self.enricher = self.enricher.with_timeout(timeout);
        self.media = self.media.with_timeout(timeout);
        self.object_store = self.object_store.with_timeout(timeout);
        self.hosting = self
            .hosting
            .into_iter()
            .map(|p| p.with_timeout(timeout))
            .collect();
        self.catalog = self.catalog.with_timeout(timeout);
        self
    }

    fn port<C>(&self, label: &str, collaborator: Arc<C>) -> DegradablePort<C>
    where
        C: Collaborator + ?Sized + 'static,
    {
        DegradablePort::new(label, Some(collaborator), self.mode).with_timeout(self.timeout)
    }

    pub fn with_lister(mut self, lister: Arc<dyn Lister>) -> Self {
        self.lister = self.port(PortLabels::LISTING, lister);
        self
    }

    pub fn with_acquirer(mut self, acquirer: Arc<dyn Acquirer>) -> Self {
        self.acquirer = self.port(PortLabels::ACQUISITION, acquirer);
        self
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = self.port(PortLabels::ENRICHMENT, enricher);
        self
    }

    pub fn with_media(mut self, media: Arc<dyn MediaSource>) -> Self {
        self.media = self.port(PortLabels::MEDIA, media);
        self
    }

    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = self.port(PortLabels::OBJECT_STORE, store);
        self
    }

    /// Add one hosting platform. A failed upload is reported, not simulated.
    pub fn with_hosting_platform(mut self, platform: Arc<dyn HostingPlatform>) -> Self {
        let label = platform.name().to_string();
        let port = self.port(&label, platform).with_fallback(Fallback::Surface);
        self.hosting.push(port);
        self
    }

    /// Install the catalog. A failed write is reported, not simulated.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogStore>) -> Self {
        self.catalog = self
            .port(PortLabels::CATALOG, catalog)
            .with_fallback(Fallback::Surface);
        self
    }

    /// Build local collaborators from validated settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mode = if settings.system.dry_run {
            RunMode::Simulation
        } else {
            RunMode::Live
        };
        let root = settings.source.root.clone();

        let mut ports = Self::unconfigured(mode)
            .with_timeout(settings.port_timeout())
            .with_lister(Arc::new(
                DirectoryLister::new(root.clone()).skipping_suffix(&settings.enrich.sidecar_suffix),
            ))
            .with_acquirer(Arc::new(LocalAcquirer::new(root.clone())))
            .with_enricher(Arc::new(SidecarEnricher::new(
                root,
                settings.enrich.sidecar_suffix.clone(),
            )))
            .with_media(Arc::new(MediaLibrary::new(settings.media.library_dir.clone())))
            .with_object_store(Arc::new(DirectoryObjectStore::new(
                settings.object_store.dir.clone(),
                settings.object_store.public_base_url.clone(),
            )));

        for platform in &settings.hosting.platforms {
            ports = ports.with_hosting_platform(Arc::new(MirrorPlatform::new(
                platform.name.clone(),
                platform.dir.clone(),
                platform.base_url.clone(),
            )));
        }

        // Dry runs never touch the catalog.
        if mode == RunMode::Live {
            let catalog = open_catalog(&settings.catalog).context("open catalog")?;
            ports = ports.with_catalog(catalog);
        }

        debug!(
            "ports: mode={:?} platforms={} timeout={:?}",
            mode,
            ports.hosting.len(),
            ports.timeout
        );
        Ok(ports)
    }
}
