//! Command handlers

pub mod analyze;
pub mod extract;
pub mod import;
pub mod list;
pub mod resolve;

pub use analyze::AnalyzeArgs;
pub use extract::ExtractArgs;
pub use import::ImportArgs;
pub use list::ListArgs;
pub use resolve::ResolveArgs;

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use super::CommandContext;
use crate::catalog::{CatalogStore, MemoryCatalog, SqliteCatalog};
use crate::import::BatchReport;

/// Read a whole input file, failing early with the path in the message
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Open the configured catalog
///
/// With `dry_run` the owner's entries are copied into memory and every write
/// lands there instead.
async fn open_store(ctx: &CommandContext, dry_run: bool) -> Result<Box<dyn CatalogStore>> {
    let sqlite = SqliteCatalog::connect(&ctx.config.database_path).await?;
    if !dry_run {
        return Ok(Box::new(sqlite));
    }

    let entries = sqlite.list_entries(ctx.owner_id, None).await?;
    log::info!("Dry run: {} entries copied into memory", entries.len());
    Ok(Box::new(MemoryCatalog::with_entries(entries)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

fn print_batch_report(report: &BatchReport, dry_run: bool) {
    if dry_run {
        println!("{}", "Dry run, nothing was written".yellow());
    }
    println!("Processed: {}", report.processed.to_string().cyan());
    println!("Created:   {}", report.created.to_string().bright_green().bold());
    println!("Updated:   {}", report.updated.to_string().bright_green());
    println!("Skipped:   {}", report.skipped.to_string().dimmed());
    if !report.conflicts.is_empty() {
        println!(
            "Conflicts: {}",
            report.conflicts.len().to_string().bright_yellow().bold()
        );
    }
}
