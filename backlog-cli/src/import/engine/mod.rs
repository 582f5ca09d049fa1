//! Reconciliation engine
//!
//! Rows are decided strictly in sheet order against an [`EntryRegistry`]
//! loaded once per batch. Every create and update goes through the store and
//! is then folded back into the registry, so later rows in the same batch
//! match entries written by earlier ones. Row-level failures become
//! [`RowOutcome::Skipped`] and never abort the batch; anything already
//! written stays written.

mod extraction;
mod manual;
mod reconcile;
mod resolution;

pub use extraction::{ExtractionOptions, run_extraction_batch};
pub use manual::run_manual_batch;
pub use reconcile::{Reconciliation, merge_payload, reconcile};
pub use resolution::resolve_conflicts;

use anyhow::Result;

use super::{
    CanonicalField, EntryPatch, GameStatus, ImportError, NewEntry, RowOutcome, Sheet, Value,
};
use super::excel::find_sheet;
use crate::catalog::CatalogStore;
use crate::services::matching::EntryRegistry;

/// Pick the sheet a batch runs on
pub fn select_sheet<'a>(sheets: &'a [Sheet], name: &str) -> Result<&'a Sheet> {
    find_sheet(sheets, name)
        .filter(|s| !s.rows.is_empty())
        .ok_or_else(|| ImportError::SheetNotFound(name.to_string()).into())
}

/// Validate and create one entry, registering it for later rows
async fn create_row(
    store: &dyn CatalogStore,
    owner_id: i64,
    registry: &mut EntryRegistry,
    row_index: usize,
    values: &[(CanonicalField, Value)],
    default_status: GameStatus,
) -> RowOutcome {
    let new = match NewEntry::from_values(values.iter().map(|(f, v)| (*f, v)), default_status) {
        Ok(new) => new,
        Err(e) => {
            log::warn!("Row {}: invalid record, skipping: {}", row_index, e);
            return RowOutcome::Skipped;
        }
    };

    match store.create_entry(owner_id, new).await {
        Ok(entry) => {
            log::debug!("Row {}: created '{}' as {}", row_index, entry.title, entry.id);
            let catalog_id = entry.id;
            registry.insert(entry);
            RowOutcome::Created { catalog_id }
        }
        Err(e) => {
            log::error!("Row {}: create failed: {:#}", row_index, e);
            RowOutcome::Skipped
        }
    }
}

/// Validate and apply a partial update, refreshing the registry copy
async fn update_row(
    store: &dyn CatalogStore,
    owner_id: i64,
    registry: &mut EntryRegistry,
    row_index: usize,
    catalog_id: i64,
    values: &[(CanonicalField, Value)],
) -> RowOutcome {
    let patch = match EntryPatch::from_values(values.iter().map(|(f, v)| (*f, v))) {
        Ok(patch) => patch,
        Err(e) => {
            log::warn!("Row {}: invalid update for {}, skipping: {}", row_index, catalog_id, e);
            return RowOutcome::Skipped;
        }
    };

    match store.update_entry(catalog_id, owner_id, &patch).await {
        Ok(Some(entry)) => {
            log::debug!(
                "Row {}: updated {} ({} fields)",
                row_index,
                catalog_id,
                patch.len()
            );
            registry.replace(entry);
            RowOutcome::Updated { catalog_id }
        }
        Ok(None) => {
            log::warn!("Row {}: entry {} no longer exists", row_index, catalog_id);
            RowOutcome::Skipped
        }
        Err(e) => {
            log::error!("Row {}: update of {} failed: {:#}", row_index, catalog_id, e);
            RowOutcome::Skipped
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use anyhow::{Result, bail};
    use async_trait::async_trait;

    use crate::extract::{ExtractionRequest, RowExtractor};
    use crate::import::{CandidateRecord, CanonicalField, CatalogEntry, GameStatus, NewEntry, Value};

    /// Extractor answering from a title → record table keyed by the first value
    #[derive(Default)]
    pub struct TableExtractor {
        pub records: HashMap<String, CandidateRecord>,
        pub failing: Vec<String>,
        pub calls: std::sync::atomic::AtomicUsize,
    }

    impl TableExtractor {
        pub fn with(mut self, key: &str, record: CandidateRecord) -> Self {
            self.records.insert(key.to_string(), record);
            self
        }

        pub fn failing(mut self, key: &str) -> Self {
            self.failing.push(key.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RowExtractor for TableExtractor {
        async fn extract(&self, request: &ExtractionRequest) -> Result<Option<CandidateRecord>> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let key = request.values.first().map(Value::key_string).unwrap_or_default();
            if self.failing.contains(&key) {
                bail!("extractor unavailable");
            }
            Ok(self.records.get(&key).cloned().map(|record| {
                record.with(CanonicalField::Status, request.target_status)
            }))
        }
    }

    pub fn entry(id: i64, title: &str, values: &[(CanonicalField, Value)]) -> CatalogEntry {
        let mut all = vec![(CanonicalField::Title, Value::from(title))];
        all.extend(values.iter().cloned());
        let new = NewEntry::from_values(all.iter().map(|(f, v)| (*f, v)), GameStatus::Backlog).unwrap();
        CatalogEntry::from_new(id, 1, new)
    }
}
