use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use super::{open_store, print_json, read_input};
use crate::cli::CommandContext;
use crate::import::engine::resolve_conflicts;
use crate::import::{ConflictItem, Resolution};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// JSON file with resolutions, or conflicts when --accept-all is set
    pub file: PathBuf,

    /// Treat FILE as a conflicts file and take the new values for every entry
    #[arg(long)]
    pub accept_all: bool,
}

fn load_resolutions(path: &Path, accept_all: bool) -> Result<Vec<Resolution>> {
    let bytes = read_input(path)?;
    if accept_all {
        let conflicts: Vec<ConflictItem> = serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid conflicts file: {}", path.display()))?;
        return Ok(conflicts.iter().map(Resolution::accept).collect());
    }
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid resolutions file: {}", path.display()))
}

pub async fn handle_resolve_command(args: ResolveArgs, ctx: &CommandContext) -> Result<()> {
    let resolutions = load_resolutions(&args.file, args.accept_all)?;
    if resolutions.is_empty() {
        anyhow::bail!("No resolutions in {}", args.file.display());
    }

    let store = open_store(ctx, false).await?;
    let report = resolve_conflicts(store.as_ref(), ctx.owner_id, &resolutions).await;

    if ctx.json {
        return print_json(&report);
    }
    println!("Resolved: {}", report.resolved.to_string().bright_green().bold());
    println!("Kept:     {}", report.kept.to_string().cyan());
    let failed = resolutions.len() - report.resolved - report.kept;
    if failed > 0 {
        println!("Failed:   {}", failed.to_string().red().bold());
    }
    Ok(())
}
