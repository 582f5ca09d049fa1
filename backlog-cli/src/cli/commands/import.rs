use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::*;

use super::{open_store, print_batch_report, print_json, read_input};
use crate::cli::CommandContext;
use crate::import::engine::{run_manual_batch, select_sheet};
use crate::import::excel::read_workbook;
use crate::import::mapping::propose_mapping;
use crate::import::resolve::ImportPlan;
use crate::import::MergeStrategy;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Workbook to import (.xlsx)
    pub file: PathBuf,

    /// Sheet to import
    #[arg(long)]
    pub sheet: String,

    /// Column plan (.toml or .json); the proposed mapping is used when omitted
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Override the plan's merge strategy (fill or overwrite)
    #[arg(long)]
    pub strategy: Option<MergeStrategy>,

    /// Run against an in-memory copy of the catalog
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle_import_command(args: ImportArgs, ctx: &CommandContext) -> Result<()> {
    let bytes = read_input(&args.file)?;
    let sheets = read_workbook(&bytes)?;
    let sheet = select_sheet(&sheets, &args.sheet)?;

    let mut plan = match &args.plan {
        Some(path) => ImportPlan::load(path)?,
        None => {
            if !ctx.json {
                println!("{}", "No plan given, using the proposed mapping".dimmed());
            }
            ImportPlan::from_proposals(&propose_mapping(&sheet.headers))
        }
    };
    if let Some(strategy) = args.strategy {
        plan = plan.strategy(strategy);
    }

    let store = open_store(ctx, args.dry_run).await?;
    let report = run_manual_batch(store.as_ref(), ctx.owner_id, sheet, &plan).await?;

    if ctx.json {
        return print_json(&report);
    }
    println!(
        "Imported sheet {} with strategy {:?}",
        sheet.name.bright_green().bold(),
        plan.merge_strategy
    );
    print_batch_report(&report, args.dry_run);
    Ok(())
}
