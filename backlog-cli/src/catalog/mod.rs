//! Catalog store collaborator
//!
//! The import engine never talks to storage directly; it lists, creates and
//! updates entries through [`CatalogStore`].

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use anyhow::Result;
use async_trait::async_trait;

use crate::import::{CatalogEntry, EntryPatch, GameStatus, NewEntry};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Entries owned by `owner_id` in id order, optionally limited to one status
    async fn list_entries(
        &self,
        owner_id: i64,
        status: Option<GameStatus>,
    ) -> Result<Vec<CatalogEntry>>;

    /// Persist a new entry and return it with its assigned id
    async fn create_entry(&self, owner_id: i64, entry: NewEntry) -> Result<CatalogEntry>;

    /// Apply a patch; `None` when no entry with that id belongs to the owner
    async fn update_entry(
        &self,
        id: i64,
        owner_id: i64,
        patch: &EntryPatch,
    ) -> Result<Option<CatalogEntry>>;
}
