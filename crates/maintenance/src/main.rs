//! Catalog maintenance CLI.
//!
//! Runs the same jobs as the admin API directly against the configured
//! store. Reports are printed to stdout as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use decorshop_infra::jobs::{DedupJob, RenameDuplicateTitlesJob};
use decorshop_infra::{AppConfig, StoreConfig, admin_stats, export_products, import_products, open_store};

#[derive(Parser)]
#[command(name = "decorshop-maint")]
#[command(about = "Maintenance jobs for the decorshop catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find pending products that duplicate confirmed ones
    Dedup {
        /// Delete the duplicates instead of only listing them
        #[arg(long)]
        apply: bool,
    },

    /// Give products with identical titles numbered suffixes
    RenameDuplicates {
        /// Write the new titles instead of only listing them
        #[arg(long)]
        apply: bool,
    },

    /// Load a `{"products": [...]}` file as pending products
    Import { path: PathBuf },

    /// Write every confirmed product to a file
    Export { path: PathBuf },

    /// Print product counts by moderation state
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    decorshop_observability::init();

    let config = AppConfig::from_env()?;
    if config.store == StoreConfig::InMemory {
        tracing::warn!("USE_PERSISTENT_STORES is off; changes will not outlive this process");
    }
    let store = open_store(&config.store)
        .await
        .context("failed to open catalog store")?;

    match cli.command {
        Commands::Dedup { apply } => {
            let job = if apply { DedupJob::apply() } else { DedupJob::dry_run() };
            let report = job.run(&*store).await?;
            print_json(&report)?;
            if !report.failed.is_empty() {
                anyhow::bail!("{} duplicate(s) could not be deleted", report.failed.len());
            }
        }
        Commands::RenameDuplicates { apply } => {
            let job = if apply {
                RenameDuplicateTitlesJob::apply()
            } else {
                RenameDuplicateTitlesJob::dry_run()
            };
            let report = job.run(&*store).await?;
            print_json(&report)?;
            if !report.failed.is_empty() {
                anyhow::bail!("{} product(s) could not be renamed", report.failed.len());
            }
        }
        Commands::Import { path } => {
            let report = import_products(&*store, &path).await?;
            print_json(&report)?;
        }
        Commands::Export { path } => {
            let exported = export_products(&*store, &path).await?;
            print_json(&serde_json::json!({ "exported": exported, "path": path.display().to_string() }))?;
        }
        Commands::Stats => {
            let stats = admin_stats(&*store).await?;
            print_json(&stats)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
