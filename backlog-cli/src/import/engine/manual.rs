//! Manual import: plan-driven resolution with a global merge strategy

use anyhow::{Context, Result};

use super::{create_row, merge_payload, update_row};
use crate::catalog::CatalogStore;
use crate::import::resolve::{ImportPlan, resolve_row};
use crate::import::{
    BatchReport, CandidateRecord, CanonicalField, GameStatus, ImportError, RowOutcome, Sheet, Value,
};
use crate::services::matching::EntryRegistry;

/// Import every row of `sheet` according to `plan`
///
/// Matched rows are merged with the plan's strategy and never produce
/// conflicts. Unmatched rows are created with their status read loosely from
/// the sheet text, defaulting to backlog.
pub async fn run_manual_batch(
    store: &dyn CatalogStore,
    owner_id: i64,
    sheet: &Sheet,
    plan: &ImportPlan,
) -> Result<BatchReport> {
    if !plan.has_title_source() {
        return Err(ImportError::MissingTitleMapping.into());
    }

    let existing = store
        .list_entries(owner_id, None)
        .await
        .context("Failed to load existing catalog entries")?;
    let mut registry = EntryRegistry::new(existing);

    log::info!(
        "Manual import of sheet '{}': {} rows, strategy {:?}, {} existing entries",
        sheet.name,
        sheet.row_count(),
        plan.merge_strategy,
        registry.len()
    );

    let mut report = BatchReport::default();
    for (row_index, row) in sheet.rows.iter().enumerate() {
        report.processed += 1;
        let candidate = resolve_row(row, plan);
        let outcome = import_row(store, owner_id, &mut registry, row_index, candidate, plan).await;
        log::debug!("Row {}: {}", row_index, outcome.label());
        report.record(outcome);
    }

    log::info!(
        "Manual import done: {} processed, {} created, {} updated, {} skipped",
        report.processed,
        report.created,
        report.updated,
        report.skipped
    );
    Ok(report)
}

async fn import_row(
    store: &dyn CatalogStore,
    owner_id: i64,
    registry: &mut EntryRegistry,
    row_index: usize,
    candidate: CandidateRecord,
    plan: &ImportPlan,
) -> RowOutcome {
    let Some(title) = candidate.title() else {
        log::debug!("Row {}: no title, skipping", row_index);
        return RowOutcome::Skipped;
    };

    let mut candidate = candidate.with(CanonicalField::Title, title.as_str());
    if let Some(status) = candidate.get(CanonicalField::Status) {
        let status = GameStatus::from_sheet_text(&status.key_string());
        candidate = candidate.with(CanonicalField::Status, status);
    }

    let matched = registry.find(&title).map(|(entry, m)| (entry.clone(), m));
    match matched {
        Some((entry, m)) => {
            log::debug!(
                "Row {}: '{}' matches {} {} ({})",
                row_index,
                title,
                entry.id,
                m.match_type.label(),
                m.score
            );
            let payload = merge_payload(&entry, &candidate, plan.merge_strategy);
            if payload.is_empty() {
                return RowOutcome::Unchanged { catalog_id: entry.id };
            }
            update_row(store, owner_id, registry, row_index, entry.id, &payload).await
        }
        None => {
            let values: Vec<(CanonicalField, Value)> =
                candidate.iter().map(|(f, v)| (f, v.clone())).collect();
            create_row(store, owner_id, registry, row_index, &values, GameStatus::Backlog).await
        }
    }
}
