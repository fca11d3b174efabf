//! CLI command handler: run a batch by default; --show-config, --stats and --backup exit early.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::collaborators::SqliteCatalog;
use crate::engine::arg_parser::Cli;
use crate::engine::tools::format_size;
use crate::ingest;
use crate::utils::settings::{CatalogBackend, Settings};
use crate::utils::config::RECENT_LIMIT;
use crate::utils::setup_logging;

/// CLI flags override file and environment settings.
fn apply_cli(settings: &mut Settings, cli: &Cli) {
    if let Some(path) = &cli.path {
        settings.source.path = path.clone();
    }
    if cli.dry_run {
        settings.system.dry_run = true;
    }
    if cli.recursive {
        settings.source.recursive = true;
    }
    if let Some(v) = cli.verbose {
        settings.system.verbose = v;
    }
}

fn open_sqlite_catalog(settings: &Settings) -> Result<SqliteCatalog> {
    if settings.catalog.backend != CatalogBackend::Sqlite {
        bail!("catalog statistics and backups need the sqlite backend");
    }
    if !settings.catalog.path.exists() {
        bail!("catalog {} does not exist", settings.catalog.path.display());
    }
    SqliteCatalog::open(&settings.catalog.path)
}

fn handle_stats(settings: &Settings) -> Result<()> {
    let catalog = open_sqlite_catalog(settings)?;
    let stats = catalog.statistics()?;
    println!("catalog: {}", settings.catalog.path.display());
    println!("  total:     {}", stats.total);
    println!("  published: {}", stats.published);
    println!("  size:      {}", format_size(stats.total_size));
    for (category, n) in &stats.by_category {
        println!("  {:<16} {}", category, n);
    }
    let recent = catalog.recent(RECENT_LIMIT)?;
    if !recent.is_empty() {
        println!("recent:");
    }
    for entry in recent {
        println!("  #{:<6} {} [{}]", entry.id, entry.record.title, entry.record.status);
    }
    Ok(())
}

fn handle_backup(settings: &Settings, dest: &Path) -> Result<()> {
    open_sqlite_catalog(settings)?
        .backup_to_file(dest)
        .with_context(|| format!("back up catalog to {}", dest.display()))?;
    info!("catalog backed up to {}", dest.display());
    Ok(())
}

/// Run the batch (default), or one of the early-exit commands.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    apply_cli(&mut settings, cli);
    setup_logging(settings.system.verbose);

    if cli.show_config {
        println!("{}", settings.summary());
        return Ok(());
    }
    if cli.stats {
        return handle_stats(&settings);
    }
    if let Some(dest) = &cli.backup {
        return handle_backup(&settings, dest);
    }

    settings.validate()?;
    if settings.system.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. EVERY COLLABORATOR IS SIMULATED.");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        cancel_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let summary = ingest(&settings, cli.limit, Some(cancel))?;
    println!("{}", summary.report());
    Ok(())
}
