//! Extraction-assisted import with conflict detection
//!
//! Extraction calls may run ahead of the row being decided, up to
//! `max_concurrent` at a time, but results are consumed in sheet order by a
//! single loop that owns the registry and issues every write.

use anyhow::{Context, Result};
use futures::StreamExt;

use super::{Reconciliation, create_row, reconcile, update_row};
use crate::catalog::CatalogStore;
use crate::extract::{ExtractionRequest, RowExtractor};
use crate::import::{
    BatchReport, CandidateRecord, CanonicalField, ConflictItem, GameStatus, Row, RowOutcome, Sheet,
    Value,
};
use crate::services::matching::EntryRegistry;

/// Settings for one extraction batch
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOptions {
    /// Status forced onto every extracted record
    pub target_status: GameStatus,
    /// Free text passed through to the extractor
    pub instructions: Option<String>,
    /// Skip rows whose raw title in this column already exists, without extracting
    pub skip_existing_column: Option<String>,
    /// Extraction calls in flight at once
    pub max_concurrent: usize,
    /// Only match against entries with this status
    pub match_status: Option<GameStatus>,
}

impl ExtractionOptions {
    pub fn new(target_status: GameStatus) -> Self {
        Self {
            target_status,
            instructions: None,
            skip_existing_column: None,
            max_concurrent: 1,
            match_status: None,
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn skip_existing(mut self, column: impl Into<String>) -> Self {
        self.skip_existing_column = Some(column.into());
        self
    }

    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    pub fn match_status(mut self, status: GameStatus) -> Self {
        self.match_status = Some(status);
        self
    }

    /// Raw title of a row in the skip-existing column, if configured and present
    fn skip_title(&self, row: &Row) -> Option<String> {
        let column = self.skip_existing_column.as_deref()?;
        let raw = row.value(column);
        if raw.is_blank() {
            return None;
        }
        Some(raw.key_string())
    }
}

/// Extract, match and reconcile every row of `sheet`
///
/// Matched rows whose populated fields disagree are returned as conflicts
/// for a later [`resolve_conflicts`](super::resolve_conflicts) call; matched
/// rows that only add information fill the entry's empty fields.
pub async fn run_extraction_batch(
    store: &dyn CatalogStore,
    extractor: &dyn RowExtractor,
    owner_id: i64,
    sheet: &Sheet,
    options: &ExtractionOptions,
) -> Result<BatchReport> {
    let existing = store
        .list_entries(owner_id, options.match_status)
        .await
        .context("Failed to load existing catalog entries")?;
    let mut registry = EntryRegistry::new(existing);
    let snapshot = registry.clone();
    let headers = sheet.named_headers();

    log::info!(
        "Extraction import of sheet '{}': {} rows as {}, {} existing entries, {} in flight",
        sheet.name,
        sheet.row_count(),
        options.target_status,
        registry.len(),
        options.max_concurrent
    );

    let mut results = futures::stream::iter(sheet.rows.iter().enumerate())
        .map(|(row_index, row)| {
            let snapshot = &snapshot;
            let headers = &headers;
            async move {
                // Entries only accumulate during a batch, so a hit here stands
                if let Some(title) = options.skip_title(row) {
                    if snapshot.find(&title).is_some() {
                        return (row_index, row, None);
                    }
                }
                let request = ExtractionRequest::from_row(
                    headers,
                    row,
                    options.target_status,
                    options.instructions.as_deref(),
                );
                (row_index, row, Some(extractor.extract(&request).await))
            }
        })
        .buffered(options.max_concurrent.max(1));

    let mut report = BatchReport::default();
    while let Some((row_index, row, extracted)) = results.next().await {
        if let Some(title) = options.skip_title(row) {
            if registry.find(&title).is_some() {
                log::info!("Row {}: skipped because '{}' already exists", row_index, title);
                report.skipped += 1;
                continue;
            }
        }

        report.processed += 1;
        let outcome = match extracted {
            None | Some(Ok(None)) => {
                log::warn!("Row {}: nothing extracted, skipping", row_index);
                RowOutcome::Skipped
            }
            Some(Err(e)) => {
                log::warn!("Row {}: extraction failed, skipping: {:#}", row_index, e);
                RowOutcome::Skipped
            }
            Some(Ok(Some(candidate))) => {
                decide_row(store, owner_id, &mut registry, row_index, candidate, options).await
            }
        };
        log::debug!("Row {}: {}", row_index, outcome.label());
        report.record(outcome);
    }

    log::info!(
        "Extraction import done: {} processed, {} created, {} updated, {} skipped, {} conflicts",
        report.processed,
        report.created,
        report.updated,
        report.skipped,
        report.conflicts.len()
    );
    Ok(report)
}

async fn decide_row(
    store: &dyn CatalogStore,
    owner_id: i64,
    registry: &mut EntryRegistry,
    row_index: usize,
    candidate: CandidateRecord,
    options: &ExtractionOptions,
) -> RowOutcome {
    let Some(title) = candidate.title() else {
        log::debug!("Row {}: extracted record has no title, skipping", row_index);
        return RowOutcome::Skipped;
    };

    let matched = registry.find(&title).map(|(entry, _)| entry.clone());
    let Some(entry) = matched else {
        let values: Vec<(CanonicalField, Value)> =
            candidate.iter().map(|(f, v)| (f, v.clone())).collect();
        return create_row(store, owner_id, registry, row_index, &values, options.target_status)
            .await;
    };

    match reconcile(&entry, &candidate) {
        Reconciliation::Conflict => {
            log::debug!("Row {}: '{}' conflicts with entry {}", row_index, title, entry.id);
            RowOutcome::Conflict(ConflictItem {
                row_index,
                catalog_id: entry.id,
                existing_values: entry.snapshot(),
                candidate_values: candidate,
            })
        }
        Reconciliation::Fill(values) => {
            update_row(store, owner_id, registry, row_index, entry.id, &values).await
        }
        Reconciliation::Unchanged => RowOutcome::Unchanged { catalog_id: entry.id },
    }
}
