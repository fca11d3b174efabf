//! ResLibs ingest: resource pipeline with deterministic simulation fallback

pub mod collaborators;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::PortError;
pub use pipeline::{BatchOrchestrator, BatchSummary, ResourceOutcome, ResourceProcessor};
pub use ports::PortSet;
pub use types::*;

use log::debug;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::pipeline::ProcessorConfig;
use crate::utils::settings::Settings;

/// Result alias used by public API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: build ports from `settings` and process up to `limit` resources.
///
/// Per-item failures are reported in the returned [`BatchSummary`]; an `Err` means the batch
/// could not start (invalid settings, catalog not openable, listing failed without fallback).
pub fn ingest(
    settings: &Settings,
    limit: usize,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<BatchSummary> {
    settings.validate()?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        settings
    );

    let ports = PortSet::from_settings(settings)?;
    let config = ProcessorConfig::from_settings(settings)?;
    let mut orchestrator = BatchOrchestrator::new(ResourceProcessor::new(ports, config))
        .with_pause(settings.pause())
        .with_recursive(settings.source.recursive)
        .with_progress(settings.system.verbose)
        .with_disk_threshold(Some(settings.disk_threshold_bytes()?));
    if let Some(cancel) = cancel {
        orchestrator = orchestrator.with_cancel_flag(cancel);
    }
    orchestrator.run(&settings.source.path, limit)
}
