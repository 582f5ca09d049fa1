use anyhow::Result;
use clap::Args;
use colored::*;

use super::{open_store, print_json};
use crate::catalog::CatalogStore;
use crate::cli::CommandContext;
use crate::import::{CatalogEntry, GameStatus};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show entries with this status (backlog or finished)
    #[arg(long)]
    pub status: Option<GameStatus>,
}

pub async fn handle_list_command(args: ListArgs, ctx: &CommandContext) -> Result<()> {
    let store = open_store(ctx, false).await?;
    let entries = store.list_entries(ctx.owner_id, args.status).await?;

    if ctx.json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("{}", "Catalog is empty".dimmed());
        return Ok(());
    }
    for entry in &entries {
        println!("{}", describe(entry));
    }
    println!("{} entries", entries.len().to_string().cyan());
    Ok(())
}

fn describe(entry: &CatalogEntry) -> String {
    let mut details = Vec::new();
    if let Some(platform) = &entry.platform {
        details.push(platform.clone());
    }
    if let Some(rating) = entry.rating {
        details.push(format!("rated {}", rating));
    }
    if let Some(hours) = entry.playtime_hours {
        details.push(format!("{}h", hours));
    }
    if entry.steam_deck {
        details.push("deck".to_string());
    }

    let status = match entry.status {
        GameStatus::Finished => entry.status.as_str().bright_green(),
        GameStatus::Backlog => entry.status.as_str().yellow(),
    };
    format!(
        "{:>5}  {:<9} {} {}",
        entry.id.to_string().dimmed(),
        status,
        entry.title.bold(),
        details.join(", ").dimmed()
    )
}
