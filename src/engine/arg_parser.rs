use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::Defaults;

/// Resource ingestion: acquire, enrich, source media, replicate and catalog a bounded batch.
#[derive(Clone, Debug, Parser)]
#[command(name = "reslibs-ingest")]
#[command(about = "Ingest resources from a listing source; use --dry-run to simulate every collaborator.")]
pub struct Cli {
    /// Listing path to process. Overrides `source.path` from the settings file.
    #[arg(long, short)]
    pub path: Option<String>,

    /// Maximum number of resources to process.
    #[arg(long, short = 'n', default_value_t = Defaults::LIMIT)]
    pub limit: usize,

    /// Simulate every collaborator; nothing is uploaded or cataloged.
    #[arg(long)]
    pub dry_run: bool,

    /// Settings file. Default: `reslibs.toml` in the current directory (optional).
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    pub show_config: bool,

    /// List the source path recursively.
    #[arg(long, short = 'r')]
    pub recursive: bool,

    /// Verbose output (debug logs and a progress bar).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Print catalog statistics and exit (sqlite backend).
    #[arg(long)]
    pub stats: bool,

    /// Copy the catalog database to FILE and exit (sqlite backend).
    #[arg(long, value_name = "FILE")]
    pub backup: Option<PathBuf>,
}
