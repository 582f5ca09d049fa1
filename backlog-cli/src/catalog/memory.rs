use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::CatalogStore;
use crate::import::{CatalogEntry, EntryPatch, GameStatus, NewEntry};

#[derive(Debug, Default)]
struct State {
    entries: Vec<CatalogEntry>,
    next_id: i64,
    writes: usize,
}

/// Catalog held in memory, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing entries; new ids continue after the highest one
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        let next_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        MemoryCatalog {
            state: Mutex::new(State {
                entries,
                next_id,
                writes: 0,
            }),
        }
    }

    /// Every entry regardless of owner
    pub async fn entries(&self) -> Vec<CatalogEntry> {
        self.state.lock().await.entries.clone()
    }

    pub async fn get(&self, id: i64) -> Option<CatalogEntry> {
        let state = self.state.lock().await;
        state.entries.iter().find(|e| e.id == id).cloned()
    }

    /// Creates plus updates applied so far
    pub async fn writes(&self) -> usize {
        self.state.lock().await.writes
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list_entries(
        &self,
        owner_id: i64,
        status: Option<GameStatus>,
    ) -> Result<Vec<CatalogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .filter(|e| status.is_none_or(|s| e.status == s))
            .cloned()
            .collect())
    }

    async fn create_entry(&self, owner_id: i64, entry: NewEntry) -> Result<CatalogEntry> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        state.writes += 1;
        let created = CatalogEntry::from_new(state.next_id, owner_id, entry);
        state.entries.push(created.clone());
        Ok(created)
    }

    async fn update_entry(
        &self,
        id: i64,
        owner_id: i64,
        patch: &EntryPatch,
    ) -> Result<Option<CatalogEntry>> {
        let mut state = self.state.lock().await;
        let Some(entry) = state
            .entries
            .iter_mut()
            .find(|e| e.id == id && e.owner_id == owner_id)
        else {
            return Ok(None);
        };
        entry.apply(patch);
        let updated = entry.clone();
        state.writes += 1;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{CanonicalField, Value};

    fn new_entry(title: &str, status: GameStatus) -> NewEntry {
        NewEntry::from_values([(CanonicalField::Title, &Value::from(title))], status).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryCatalog::new();
        let a = store.create_entry(1, new_entry("Hades", GameStatus::Backlog)).await.unwrap();
        let b = store.create_entry(1, new_entry("Celeste", GameStatus::Finished)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.writes().await, 2);
    }

    #[tokio::test]
    async fn test_list_filters_owner_and_status() {
        let store = MemoryCatalog::new();
        store.create_entry(1, new_entry("Hades", GameStatus::Backlog)).await.unwrap();
        store.create_entry(1, new_entry("Celeste", GameStatus::Finished)).await.unwrap();
        store.create_entry(2, new_entry("Doom", GameStatus::Backlog)).await.unwrap();

        assert_eq!(store.list_entries(1, None).await.unwrap().len(), 2);
        let finished = store.list_entries(1, Some(GameStatus::Finished)).await.unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].title, "Celeste");
    }

    #[tokio::test]
    async fn test_update_respects_owner() {
        let store = MemoryCatalog::new();
        let entry = store.create_entry(1, new_entry("Hades", GameStatus::Backlog)).await.unwrap();
        let patch = EntryPatch::from_values([(CanonicalField::Rating, &Value::Float(9.5))]).unwrap();

        assert!(store.update_entry(entry.id, 2, &patch).await.unwrap().is_none());
        let updated = store.update_entry(entry.id, 1, &patch).await.unwrap().unwrap();
        assert_eq!(updated.rating, Some(9.5));
        assert_eq!(store.get(entry.id).await.unwrap().rating, Some(9.5));
    }
}
