// Matching service for reconciling candidate titles with the catalog
//
// The registry is the batch's working copy of the catalog: it is loaded once
// per batch and every write made during the batch is folded back into it, so
// later rows see entries created or updated by earlier ones.

pub mod core;
pub mod models;

// Re-export commonly used types
pub use core::{TITLE_MATCH_THRESHOLD, match_title};
pub use models::{MatchType, TitleMatch};

use crate::import::CatalogEntry;
use std::collections::HashMap;

/// Ordered in-memory view of an owner's catalog entries
#[derive(Debug, Clone, Default)]
pub struct EntryRegistry {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<i64, usize>,
}

impl EntryRegistry {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.id, idx))
            .collect();
        Self { entries, by_id }
    }

    /// Append a freshly created entry
    pub fn insert(&mut self, entry: CatalogEntry) {
        if self.by_id.contains_key(&entry.id) {
            self.replace(entry);
            return;
        }
        self.by_id.insert(entry.id, self.entries.len());
        self.entries.push(entry);
    }

    /// Swap in the stored version of an entry after an update
    pub fn replace(&mut self, entry: CatalogEntry) {
        match self.by_id.get(&entry.id) {
            Some(&idx) => self.entries[idx] = entry,
            None => self.insert(entry),
        }
    }

    pub fn get(&self, id: i64) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a title to the entry it most likely refers to
    pub fn find(&self, title: &str) -> Option<(&CatalogEntry, TitleMatch)> {
        let found = match_title(title, &self.entries)?;
        let entry = self.get(found.catalog_id)?;
        Some((entry, found))
    }
}
