//! Concurrent replication of one artifact to every hosting platform.
//!
//! One scoped thread per platform; all are joined before the stage completes. Results are
//! keyed by platform name, so completion order does not matter.

use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::PortError;
use crate::ports::simulate::simulated_hosting_url;
use crate::ports::{Degraded, DegradablePort, HostingPlatform};
use crate::types::HostingLink;

/// Aggregated fan-out outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Number of platforms dispatched.
    pub attempted: usize,
    /// Platform -> public URL, for platforms that produced one.
    pub links: BTreeMap<String, String>,
    /// Platform -> failure reason.
    pub failures: BTreeMap<String, String>,
    /// Platforms whose URL was simulated.
    pub simulated: Vec<String>,
}

impl FanoutReport {
    /// True when no platform is configured or at least one produced a URL.
    pub fn is_success(&self) -> bool {
        self.attempted == 0 || !self.links.is_empty()
    }

    pub fn hosting_links(&self) -> Vec<HostingLink> {
        self.links
            .iter()
            .map(|(platform, url)| HostingLink {
                platform: platform.clone(),
                url: url.clone(),
            })
            .collect()
    }
}

/// Uploads to a fixed set of platform ports.
pub struct UploadFanout<'a> {
    platforms: &'a [DegradablePort<dyn HostingPlatform>],
}

impl<'a> UploadFanout<'a> {
    pub fn new(platforms: &'a [DegradablePort<dyn HostingPlatform>]) -> Self {
        Self { platforms }
    }

    /// Upload `local_path` as `filename` everywhere and wait for all uploads.
    pub fn run(&self, local_path: &Path, filename: &str) -> FanoutReport {
        let mut report = FanoutReport {
            attempted: self.platforms.len(),
            ..FanoutReport::default()
        };
        if self.platforms.is_empty() {
            debug!("no hosting platforms configured, skipping replication");
            return report;
        }

        let results: Vec<(String, Result<Degraded<String>, PortError>)> = thread::scope(|s| {
            let handles: Vec<_> = self
                .platforms
                .iter()
                .map(|port| {
                    let path = local_path.to_path_buf();
                    let name = filename.to_string();
                    s.spawn(move || (port.label().to_string(), upload_one(port, path, name)))
                })
                .collect();

            handles
                .into_iter()
                .zip(self.platforms.iter())
                .map(|(handle, port)| {
                    handle.join().unwrap_or_else(|_| {
                        (
                            port.label().to_string(),
                            Err(PortError::Upload {
                                target: port.label().to_string(),
                                detail: "upload worker panicked".to_string(),
                            }),
                        )
                    })
                })
                .collect()
        });

        for (platform, result) in results {
            match result {
                Ok(degraded) => {
                    if degraded.is_simulated() {
                        report.simulated.push(platform.clone());
                    }
                    info!("{}: {}", platform, degraded.value);
                    report.links.insert(platform, degraded.value);
                }
                Err(e) => {
                    warn!("{}: upload failed: {}", platform, e);
                    report.failures.insert(platform, e.to_string());
                }
            }
        }
        report
    }
}

fn upload_one(
    port: &DegradablePort<dyn HostingPlatform>,
    path: PathBuf,
    filename: String,
) -> Result<Degraded<String>, PortError> {
    let platform = port.label().to_string();
    let sim_name = filename.clone();
    port.invoke(
        move |p| p.put(&path, &filename),
        move || Ok(simulated_hosting_url(&platform, &sim_name)),
    )
}
