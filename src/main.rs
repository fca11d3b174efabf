//! reslibs-ingest CLI: process a bounded batch of resources; use --dry-run to simulate.

use anyhow::Result;
use clap::Parser;
use reslibs_ingest::engine::arg_parser::Cli;
use reslibs_ingest::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
