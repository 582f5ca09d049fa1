//! Command-line surface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use commands::{AnalyzeArgs, ExtractArgs, ImportArgs, ListArgs, ResolveArgs};

#[derive(Parser)]
#[command(
    name = "backlog-cli",
    about = "Import spreadsheet exports into a game backlog catalog",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog owner (defaults to `owner_id` from the config)
    #[arg(long, global = true)]
    pub owner: Option<i64>,

    /// Print machine-readable JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show sheets, headers, row counts and proposed column mappings
    Analyze(AnalyzeArgs),

    /// Import a sheet with an explicit column plan
    Import(ImportArgs),

    /// Import a sheet through the row extractor, queueing conflicts
    Extract(ExtractArgs),

    /// Apply decisions on queued conflicts
    Resolve(ResolveArgs),

    /// List catalog entries
    List(ListArgs),
}

/// Settings shared by every command
pub struct CommandContext {
    pub config: Config,
    pub owner_id: i64,
    pub json: bool,
}

impl CommandContext {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let owner_id = cli.owner.unwrap_or(config.owner_id);
        Ok(CommandContext {
            config,
            owner_id,
            json: cli.json,
        })
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = CommandContext::new(&cli)?;

    match cli.command {
        Commands::Analyze(args) => commands::analyze::handle_analyze_command(args, &ctx).await,
        Commands::Import(args) => commands::import::handle_import_command(args, &ctx).await,
        Commands::Extract(args) => commands::extract::handle_extract_command(args, &ctx).await,
        Commands::Resolve(args) => commands::resolve::handle_resolve_command(args, &ctx).await,
        Commands::List(args) => commands::list::handle_list_command(args, &ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{GameStatus, MergeStrategy};

    #[test]
    fn test_parse_extract_command() {
        let cli = Cli::try_parse_from([
            "backlog-cli",
            "--owner",
            "3",
            "extract",
            "games.xlsx",
            "--sheet",
            "Pendientes",
            "--status",
            "finished",
            "--skip-existing-column",
            "Juego",
            "--max-concurrent",
            "6",
        ])
        .unwrap();

        assert_eq!(cli.owner, Some(3));
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.sheet, "Pendientes");
        assert_eq!(args.status, GameStatus::Finished);
        assert_eq!(args.skip_existing_column.as_deref(), Some("Juego"));
        assert_eq!(args.max_concurrent, Some(6));
    }

    #[test]
    fn test_parse_import_strategy() {
        let cli = Cli::try_parse_from([
            "backlog-cli",
            "import",
            "games.xlsx",
            "--sheet",
            "Backlog",
            "--strategy",
            "overwrite",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.strategy, Some(MergeStrategy::Overwrite));
        assert!(args.plan.is_none());
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(
            Cli::try_parse_from(["backlog-cli", "list", "--status", "playing"]).is_err()
        );
    }
}
