//! Pure decisions for a candidate that matched an existing entry

use crate::import::{CandidateRecord, CanonicalField, CatalogEntry, MergeStrategy, Value};

/// What to do with a matched row on the extraction path
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// A populated field disagrees with the candidate
    Conflict,
    /// Write these fields, all currently null on the entry
    Fill(Vec<(CanonicalField, Value)>),
    /// Everything already agrees
    Unchanged,
}

/// Compare a candidate against the entry it matched
///
/// Every candidate field except the title is compared to the entry's
/// normalized value. A single populated field that differs makes the row a
/// conflict; otherwise the null fields are filled.
pub fn reconcile(existing: &CatalogEntry, candidate: &CandidateRecord) -> Reconciliation {
    let mut fill = Vec::new();

    for (field, value) in candidate.iter() {
        if field == CanonicalField::Title {
            continue;
        }
        let current = existing.value(field);
        if current.is_null() {
            fill.push((field, value.clone()));
        } else if !current.same_scalar(value) {
            log::debug!(
                "Entry {}: {} differs ({} vs {})",
                existing.id,
                field,
                current,
                value
            );
            return Reconciliation::Conflict;
        }
    }

    if fill.is_empty() {
        Reconciliation::Unchanged
    } else {
        Reconciliation::Fill(fill)
    }
}

/// Fields the manual path writes to a matched entry
///
/// `Overwrite` takes every candidate field. `Fill` takes only fields that are
/// null or empty text on the entry, and never looks for conflicts.
pub fn merge_payload(
    existing: &CatalogEntry,
    candidate: &CandidateRecord,
    strategy: MergeStrategy,
) -> Vec<(CanonicalField, Value)> {
    candidate
        .iter()
        .filter(|(field, _)| match strategy {
            MergeStrategy::Overwrite => true,
            MergeStrategy::Fill => existing.value(*field).is_blank(),
        })
        .map(|(field, value)| (field, value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{EntryPatch, GameStatus, NewEntry};

    fn entry_with(values: &[(CanonicalField, Value)]) -> CatalogEntry {
        let mut entry = CatalogEntry::from_new(
            5,
            1,
            NewEntry::from_values(
                [(CanonicalField::Title, &Value::from("Hades"))],
                GameStatus::Backlog,
            )
            .unwrap(),
        );
        let patch = EntryPatch::from_values(values.iter().map(|(f, v)| (*f, v))).unwrap();
        entry.apply(&patch);
        entry
    }

    #[test]
    fn test_populated_difference_is_conflict() {
        let existing = entry_with(&[(CanonicalField::Rating, Value::Float(8.0))]);
        let candidate = CandidateRecord::new()
            .with(CanonicalField::Title, "Hades")
            .with(CanonicalField::Rating, 9.0);
        assert_eq!(reconcile(&existing, &candidate), Reconciliation::Conflict);
    }

    #[test]
    fn test_null_field_is_filled() {
        let existing = entry_with(&[]);
        let candidate = CandidateRecord::new()
            .with(CanonicalField::Title, "Hades")
            .with(CanonicalField::Rating, 9.0);
        assert_eq!(
            reconcile(&existing, &candidate),
            Reconciliation::Fill(vec![(CanonicalField::Rating, Value::Float(9.0))])
        );
    }

    #[test]
    fn test_conflict_wins_over_fill() {
        let existing = entry_with(&[(CanonicalField::Platform, Value::from("PC"))]);
        let candidate = CandidateRecord::new()
            .with(CanonicalField::Rating, 9.0)
            .with(CanonicalField::Platform, "Switch");
        assert_eq!(reconcile(&existing, &candidate), Reconciliation::Conflict);
    }

    #[test]
    fn test_enums_and_numbers_compare_as_scalars() {
        let existing = entry_with(&[
            (CanonicalField::Status, Value::from("finished")),
            (CanonicalField::Progress, Value::from("Terminado")),
            (CanonicalField::Rating, Value::Int(9)),
        ]);
        let candidate = CandidateRecord::new()
            .with(CanonicalField::Title, "HADES")
            .with(CanonicalField::Status, "finished")
            .with(CanonicalField::Progress, "Terminado")
            .with(CanonicalField::Rating, 9i64);
        assert_eq!(reconcile(&existing, &candidate), Reconciliation::Unchanged);
    }

    #[test]
    fn test_steam_deck_default_is_compared() {
        let existing = entry_with(&[]);
        let candidate = CandidateRecord::new().with(CanonicalField::SteamDeck, true);
        assert_eq!(reconcile(&existing, &candidate), Reconciliation::Conflict);
    }

    #[test]
    fn test_merge_payload_strategies() {
        let existing = entry_with(&[
            (CanonicalField::Rating, Value::Float(8.0)),
            (CanonicalField::Notes, Value::from("")),
        ]);
        let candidate = CandidateRecord::new()
            .with(CanonicalField::Title, "Hades")
            .with(CanonicalField::Rating, 9.0)
            .with(CanonicalField::Notes, "great")
            .with(CanonicalField::Platform, "PC");

        let fill = merge_payload(&existing, &candidate, MergeStrategy::Fill);
        assert_eq!(
            fill,
            vec![
                (CanonicalField::Platform, Value::from("PC")),
                (CanonicalField::Notes, Value::from("great")),
            ]
        );

        let overwrite = merge_payload(&existing, &candidate, MergeStrategy::Overwrite);
        assert_eq!(overwrite.len(), 4);
    }
}
