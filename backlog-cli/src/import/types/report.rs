//! Batch outcomes, conflicts, and resolutions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CandidateRecord, CanonicalField, Value};

/// What happened to a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// No usable title, failed validation, or extraction failed
    Skipped,
    /// A new catalog entry was created
    Created { catalog_id: i64 },
    /// The matched entry was updated
    Updated { catalog_id: i64 },
    /// Matched, but nothing to write
    Unchanged { catalog_id: i64 },
    /// Matched with disagreeing values; queued for resolution
    Conflict(ConflictItem),
}

impl RowOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RowOutcome::Skipped => "skipped",
            RowOutcome::Created { .. } => "created",
            RowOutcome::Updated { .. } => "updated",
            RowOutcome::Unchanged { .. } => "unchanged",
            RowOutcome::Conflict(_) => "conflict",
        }
    }
}

/// Global merge rule for the manual import path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Write every resolved field unconditionally
    Overwrite,
    /// Write only fields that are currently empty
    #[default]
    Fill,
}

impl std::str::FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overwrite" => Ok(MergeStrategy::Overwrite),
            "fill" => Ok(MergeStrategy::Fill),
            _ => Err(format!("merge strategy must be 'overwrite' or 'fill', got '{}'", s)),
        }
    }
}

/// A row whose candidate values disagree with the matched entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictItem {
    pub row_index: usize,
    pub catalog_id: i64,
    /// Every field of the matched entry at detection time
    pub existing_values: BTreeMap<CanonicalField, Value>,
    /// The full candidate payload
    pub candidate_values: CandidateRecord,
}

/// Which side of a conflict wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionChoice {
    New,
    Existing,
}

/// A user decision on one conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub catalog_id: i64,
    pub choice: ResolutionChoice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_values: Option<BTreeMap<CanonicalField, Value>>,
}

impl Resolution {
    pub fn keep(catalog_id: i64) -> Self {
        Resolution {
            catalog_id,
            choice: ResolutionChoice::Existing,
            new_values: None,
        }
    }

    pub fn take_new(catalog_id: i64, new_values: BTreeMap<CanonicalField, Value>) -> Self {
        Resolution {
            catalog_id,
            choice: ResolutionChoice::New,
            new_values: Some(new_values),
        }
    }

    /// Accept the candidate side of a conflict wholesale (title excluded)
    pub fn accept(conflict: &ConflictItem) -> Self {
        let values = conflict
            .candidate_values
            .iter()
            .filter(|(field, _)| *field != CanonicalField::Title)
            .map(|(field, value)| (field, value.clone()))
            .collect();
        Self::take_new(conflict.catalog_id, values)
    }
}

/// Counters and conflict queue for one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub conflicts: Vec<ConflictItem>,
}

impl BatchReport {
    /// Fold one row outcome into the counters
    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Created { .. } => self.created += 1,
            RowOutcome::Updated { .. } => self.updated += 1,
            RowOutcome::Unchanged { .. } => {}
            RowOutcome::Conflict(item) => self.conflicts.push(item),
        }
    }
}

/// Counters for one resolution call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub resolved: usize,
    pub kept: usize,
}
