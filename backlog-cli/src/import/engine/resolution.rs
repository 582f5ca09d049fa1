//! Second phase: apply user decisions on queued conflicts

use crate::catalog::CatalogStore;
use crate::import::{EntryPatch, Resolution, ResolutionChoice, ResolutionReport};

/// Apply resolutions, each located only by its catalog id
///
/// Taking the new side writes the supplied values unconditionally. Anything
/// else, including "new" without values, keeps the entry as it is. A write
/// that fails is logged and counted in neither column.
pub async fn resolve_conflicts(
    store: &dyn CatalogStore,
    owner_id: i64,
    resolutions: &[Resolution],
) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    for resolution in resolutions {
        let values = match (&resolution.choice, &resolution.new_values) {
            (ResolutionChoice::New, Some(values)) if !values.is_empty() => values,
            _ => {
                log::debug!("Entry {}: keeping existing values", resolution.catalog_id);
                report.kept += 1;
                continue;
            }
        };

        let patch = match EntryPatch::from_values(values.iter().map(|(f, v)| (*f, v))) {
            Ok(patch) => patch,
            Err(e) => {
                log::error!("Resolve error for entry {}: {}", resolution.catalog_id, e);
                continue;
            }
        };

        match store.update_entry(resolution.catalog_id, owner_id, &patch).await {
            Ok(Some(_)) => {
                log::debug!(
                    "Entry {}: applied {} new values",
                    resolution.catalog_id,
                    patch.len()
                );
                report.resolved += 1;
            }
            Ok(None) => log::error!("Resolve error: entry {} not found", resolution.catalog_id),
            Err(e) => log::error!(
                "Resolve error for entry {}: {:#}",
                resolution.catalog_id,
                e
            ),
        }
    }

    log::info!(
        "Resolution done: {} resolved, {} kept",
        report.resolved,
        report.kept
    );
    report
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::import::engine::test_support::entry;
    use crate::import::{CanonicalField, Value};

    fn store() -> MemoryCatalog {
        MemoryCatalog::with_entries(vec![entry(
            5,
            "Hades",
            &[(CanonicalField::Rating, Value::Float(8.0))],
        )])
    }

    #[tokio::test]
    async fn test_existing_choice_keeps_entry() {
        let store = store();
        let report = resolve_conflicts(&store, 1, &[Resolution::keep(5)]).await;
        assert_eq!(report, ResolutionReport { resolved: 0, kept: 1 });
        assert_eq!(store.get(5).await.unwrap().rating, Some(8.0));
    }

    #[tokio::test]
    async fn test_new_choice_writes_unconditionally() {
        let store = store();
        let values = BTreeMap::from([(CanonicalField::Rating, Value::Float(9.5))]);
        let report = resolve_conflicts(&store, 1, &[Resolution::take_new(5, values)]).await;
        assert_eq!(report, ResolutionReport { resolved: 1, kept: 0 });
        assert_eq!(store.get(5).await.unwrap().rating, Some(9.5));
    }

    #[tokio::test]
    async fn test_new_without_values_counts_as_kept() {
        let store = store();
        let resolutions = [
            Resolution::take_new(5, BTreeMap::new()),
            Resolution {
                catalog_id: 5,
                choice: ResolutionChoice::New,
                new_values: None,
            },
        ];
        let report = resolve_conflicts(&store, 1, &resolutions).await;
        assert_eq!(report.kept, 2);
        assert_eq!(store.writes().await, 0);
    }

    #[tokio::test]
    async fn test_failed_writes_count_nowhere() {
        let store = store();
        let resolutions = [
            Resolution::take_new(99, BTreeMap::from([(CanonicalField::Rating, Value::Float(1.0))])),
            Resolution::take_new(5, BTreeMap::from([(CanonicalField::Rating, Value::from("bad"))])),
            Resolution::keep(5),
        ];
        let report = resolve_conflicts(&store, 1, &resolutions).await;
        assert_eq!(report, ResolutionReport { resolved: 0, kept: 1 });
        assert_eq!(store.get(5).await.unwrap().rating, Some(8.0));
    }
}
