//! Batch driver: list, bound, process sequentially with pacing, summarize.

use anyhow::{Context, Result};
use kdam::Animation;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::engine::progress::{
    ProgressBar, ProgressBarConfig, create_progress_bar, set_current_item, update_progress_bar,
};
use crate::error::PortError;
use crate::pipeline::processor::{ResourceOutcome, ResourceProcessor};
use crate::ports::simulate::simulated_listing;
use crate::types::ResourceDescriptor;
use crate::utils::disk::warn_if_low_space;

/// Delay between items. Injectable so tests can count pauses.
pub trait Pacer: Send + Sync {
    fn pause(&self, interval: Duration);
}

/// Sleeps the current thread.
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, interval: Duration) {
        thread::sleep(interval);
    }
}

/// Counts for one orchestrator run. `attempted == succeeded + failed`.
#[derive(Clone, Debug, Default)]
pub struct BatchSummary {
    pub listed: usize,
    pub limit: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Stopped early at an item boundary.
    pub cancelled: bool,
    pub outcomes: Vec<ResourceOutcome>,
}

impl BatchSummary {
    fn record(&mut self, outcome: ResourceOutcome) {
        self.attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Multi-line report printed by the CLI.
    pub fn report(&self) -> String {
        let mut out = format!(
            "listed: {}  limit: {}  attempted: {}  succeeded: {}  failed: {}",
            self.listed, self.limit, self.attempted, self.succeeded, self.failed
        );
        if self.cancelled {
            out.push_str("  (cancelled)");
        }
        for o in &self.outcomes {
            let status = match (&o.failure, o.catalog_id) {
                (Some(f), _) => format!("FAILED at {}: {}", f.stage, f.reason),
                (None, Some(id)) => format!("ok #{}", id),
                (None, None) => "ok".to_string(),
            };
            out.push_str(&format!("\n  {} -> {}", o.name, status));
            if !o.simulated.is_empty() {
                out.push_str(&format!(" [simulated: {}]", o.simulated.join(", ")));
            }
        }
        out
    }
}

pub struct BatchOrchestrator {
    processor: ResourceProcessor,
    pause: Duration,
    pacer: Arc<dyn Pacer>,
    cancel: Option<Arc<AtomicBool>>,
    recursive: bool,
    show_progress: bool,
    disk_threshold: Option<u64>,
}

impl BatchOrchestrator {
    pub fn new(processor: ResourceProcessor) -> Self {
        Self {
            processor,
            pause: Duration::ZERO,
            pacer: Arc::new(ThreadPacer),
            cancel: None,
            recursive: false,
            show_progress: false,
            disk_threshold: None,
        }
    }

    /// Interval slept after every non-final item.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Flag checked before each item; when set the batch stops there.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Warn before the batch when free space under the download dir is below `threshold` bytes.
    pub fn with_disk_threshold(mut self, threshold: Option<u64>) -> Self {
        self.disk_threshold = threshold;
        self
    }

    pub fn processor(&self) -> &ResourceProcessor {
        &self.processor
    }

    /// Candidate descriptors from the listing port.
    pub fn list(&self, path: &str) -> std::result::Result<Vec<ResourceDescriptor>, PortError> {
        let owned = path.to_string();
        let recursive = self.recursive;
        self.processor
            .ports()
            .lister
            .invoke(
                move |l| l.list(&owned, recursive),
                || Ok(simulated_listing(path)),
            )
            .map(|d| d.value)
    }

    /// Process up to `limit` listed resources. Item failures are counted, never returned.
    pub fn run(&self, path: &str, limit: usize) -> Result<BatchSummary> {
        let listed = self
            .list(path)
            .with_context(|| format!("list resources under {}", path))?;
        let selected: Vec<&ResourceDescriptor> = listed.iter().take(limit).collect();
        info!(
            "found {} resources, processing {} (limit {})",
            listed.len(),
            selected.len(),
            limit
        );

        if let Some(threshold) = self.disk_threshold {
            warn_if_low_space(&self.processor.config().download_dir, threshold);
        }

        let mut summary = BatchSummary {
            listed: listed.len(),
            limit,
            ..BatchSummary::default()
        };
        let bar = self.progress_bar(selected.len());

        for (i, descriptor) in selected.iter().enumerate() {
            if self.is_cancelled() {
                warn!("cancelled before {} ({} of {})", descriptor.name, i + 1, selected.len());
                summary.cancelled = true;
                break;
            }
            info!("[{}/{}] {}", i + 1, selected.len(), descriptor.name);
            if let Some(bar) = &bar {
                set_current_item(bar, &descriptor.name);
            }
            let outcome = self.processor.process(descriptor);
            summary.record(outcome);
            if let Some(bar) = &bar {
                update_progress_bar(bar, 1);
            }

            if i + 1 < selected.len() && !self.pause.is_zero() {
                debug!("pausing {:?}", self.pause);
                self.pacer.pause(self.pause);
            }
        }

        info!(
            "batch done: {} attempted, {} succeeded, {} failed",
            summary.attempted, summary.succeeded, summary.failed
        );
        Ok(summary)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        (self.show_progress && total > 0).then(|| {
            create_progress_bar(ProgressBarConfig::new(total, "Resources", Animation::Classic))
        })
    }
}
