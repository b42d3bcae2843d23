use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use metsfix_core::{backup, RepairConfig, RunReport};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "metsfix",
    about = "Repairs duplicate scanned-image references in METS metadata files",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output the run report as JSON (for scripts).
    #[arg(long, global = true)]
    json: bool,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Metadata filename to look for (default: meta.xml).
    #[arg(long, global = true)]
    meta_filename: Option<String>,

    /// Image reference extension (default: .tif).
    #[arg(long, global = true)]
    image_ext: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Repair every metadata file under a directory.
    Fix { dir: PathBuf },

    /// Detect and report duplicates without changing anything.
    Scan { dir: PathBuf },

    /// Delete backup files left behind by earlier runs.
    Cleanup { dir: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match &cli.command {
        Commands::Fix { dir } => {
            let report = metsfix_core::repair_tree(dir, &config)
                .with_context(|| format!("repair run over {} failed", dir.display()))?;
            print_report(&report, cli.json)?;
        }
        Commands::Scan { dir } => {
            let report = metsfix_core::scan_tree(dir, &config)
                .with_context(|| format!("scan over {} failed", dir.display()))?;
            print_report(&report, cli.json)?;
        }
        Commands::Cleanup { dir } => {
            let removed = backup::cleanup_backups(dir, &config.meta_filename)
                .with_context(|| format!("cleanup under {} failed", dir.display()))?;
            if cli.json {
                println!("{}", serde_json::json!({ "backups_deleted": removed }));
            } else {
                info!("Total backup files deleted: {removed}");
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<RepairConfig> {
    let mut config = match &cli.config {
        Some(path) => RepairConfig::load(path)
            .with_context(|| format!("could not load config from {}", path.display()))?,
        None => RepairConfig::default(),
    };
    if let Some(name) = &cli.meta_filename {
        config.meta_filename = name.clone();
    }
    if let Some(ext) = &cli.image_ext {
        config.image_extension = ext.clone();
    }
    Ok(config)
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    info!("Number of files with duplicates: {}", report.files_with_duplicates);
    info!("Total count of duplicates: {}", report.total_duplicates);
    info!("\"{}\"", report.id_line());
    for err in &report.errors {
        info!("failed: {} ({})", err.path.display(), err.message);
    }
    Ok(())
}
