use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::*;

use super::{print_json, read_input};
use crate::cli::CommandContext;
use crate::import::analyze::analyze_workbook;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Workbook to inspect (.xlsx)
    pub file: PathBuf,
}

pub async fn handle_analyze_command(args: AnalyzeArgs, ctx: &CommandContext) -> Result<()> {
    let bytes = read_input(&args.file)?;
    let sheets = analyze_workbook(&bytes)?;

    if ctx.json {
        return print_json(&sheets);
    }

    if sheets.is_empty() {
        println!("{}", "No sheets with data".yellow());
        return Ok(());
    }

    for sheet in &sheets {
        println!(
            "{} ({} rows)",
            sheet.name.bright_green().bold(),
            sheet.row_count
        );
        println!("  Headers: {}", sheet.headers.join(", ").dimmed());
        for (field, proposal) in &sheet.proposals {
            match &proposal.selected_header {
                Some(header) => {
                    let alternatives = if proposal.alternatives.is_empty() {
                        String::new()
                    } else {
                        format!(" (also: {})", proposal.alternatives.join(", "))
                    };
                    println!(
                        "  {:<16} <- {} [{}]{}",
                        field.as_str(),
                        header.cyan(),
                        proposal.score,
                        alternatives.dimmed()
                    );
                }
                None => println!("  {:<16} {}", field.as_str(), "-".dimmed()),
            }
        }
        println!();
    }
    Ok(())
}
