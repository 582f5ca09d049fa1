use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use super::{open_store, print_batch_report, print_json, read_input};
use crate::cli::CommandContext;
use crate::extract::ChatExtractor;
use crate::import::GameStatus;
use crate::import::engine::{ExtractionOptions, run_extraction_batch, select_sheet};
use crate::import::excel::read_workbook;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Workbook to import (.xlsx)
    pub file: PathBuf,

    /// Sheet to import
    #[arg(long)]
    pub sheet: String,

    /// Status given to every imported game (backlog or finished)
    #[arg(long)]
    pub status: GameStatus,

    /// Extra instructions passed to the extractor
    #[arg(long)]
    pub instructions: Option<String>,

    /// Skip rows whose title in this column is already in the catalog
    #[arg(long)]
    pub skip_existing_column: Option<String>,

    /// Only match against entries with this status
    #[arg(long)]
    pub match_status: Option<GameStatus>,

    /// Extraction calls in flight at once (defaults to the config)
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Write queued conflicts to this JSON file
    #[arg(long)]
    pub conflicts: Option<PathBuf>,

    /// Run against an in-memory copy of the catalog
    #[arg(long)]
    pub dry_run: bool,
}

impl ExtractArgs {
    fn options(&self, default_concurrency: usize) -> ExtractionOptions {
        let mut options = ExtractionOptions::new(self.status)
            .max_concurrent(self.max_concurrent.unwrap_or(default_concurrency));
        if let Some(instructions) = &self.instructions {
            options = options.instructions(instructions.clone());
        }
        if let Some(column) = &self.skip_existing_column {
            options = options.skip_existing(column.clone());
        }
        if let Some(status) = self.match_status {
            options = options.match_status(status);
        }
        options
    }
}

pub async fn handle_extract_command(args: ExtractArgs, ctx: &CommandContext) -> Result<()> {
    let bytes = read_input(&args.file)?;
    let sheets = read_workbook(&bytes)?;
    let sheet = select_sheet(&sheets, &args.sheet)?;

    let settings = &ctx.config.extractor;
    let extractor = ChatExtractor::new(settings.client_config())?;
    let options = args.options(settings.max_concurrent);

    let store = open_store(ctx, args.dry_run).await?;
    let report =
        run_extraction_batch(store.as_ref(), &extractor, ctx.owner_id, sheet, &options).await?;

    if let Some(path) = &args.conflicts {
        let content = serde_json::to_string_pretty(&report.conflicts)
            .context("Failed to serialize conflicts")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write conflicts to: {}", path.display()))?;
        if !ctx.json {
            println!(
                "Wrote {} conflicts to {}",
                report.conflicts.len(),
                path.display().to_string().cyan()
            );
        }
    }

    if ctx.json {
        return print_json(&report);
    }
    println!(
        "Extracted sheet {} as {}",
        sheet.name.bright_green().bold(),
        options.target_status.to_string().cyan()
    );
    print_batch_report(&report, args.dry_run);
    if !report.conflicts.is_empty() && args.conflicts.is_none() {
        println!(
            "{}",
            "Conflicts were not saved; pass --conflicts to keep them for `resolve`".dimmed()
        );
    }
    Ok(())
}
