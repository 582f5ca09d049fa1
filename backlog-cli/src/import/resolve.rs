//! Per-row value resolution for the manual import path
//!
//! Precedence per field: Constant → Column (with substitution) → unset.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::mapping::{MappingProposal, selected_columns};
use super::{CandidateRecord, CanonicalField, MergeStrategy, Row, Value};

/// Replacement values for one field, looked up by raw value then by cell color
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionTable {
    /// Keyed by the cell value rendered as text
    #[serde(default)]
    pub by_value: BTreeMap<String, Value>,
    /// Keyed by six-digit hex color, case-insensitive
    #[serde(default)]
    pub by_color: BTreeMap<String, Value>,
}

impl SubstitutionTable {
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.by_value.insert(key.into(), value.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>, value: impl Into<Value>) -> Self {
        self.by_color.insert(color.into(), value.into());
        self
    }

    /// Replacement for a cell, if any; the value key is checked first
    pub fn lookup(&self, raw: &Value, color: Option<&str>) -> Option<&Value> {
        if let Some(hit) = self.by_value.get(&raw.key_string()) {
            return Some(hit);
        }
        let color = color?;
        self.by_color
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(color))
            .map(|(_, value)| value)
    }
}

/// How one sheet is turned into candidate records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPlan {
    /// Field → header; a null header leaves the field unmapped
    #[serde(default)]
    pub column_mapping: BTreeMap<CanonicalField, Option<String>>,
    /// Field → literal applied to every row
    #[serde(default)]
    pub constants: BTreeMap<CanonicalField, Value>,
    #[serde(default)]
    pub substitutions: BTreeMap<CanonicalField, SubstitutionTable>,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

impl ImportPlan {
    /// Seed a plan from the headers the proposer selected
    pub fn from_proposals(proposals: &BTreeMap<CanonicalField, MappingProposal>) -> Self {
        ImportPlan {
            column_mapping: selected_columns(proposals)
                .into_iter()
                .map(|(field, header)| (field, Some(header)))
                .collect(),
            ..Default::default()
        }
    }

    /// Load a plan from a `.json` file, anything else is read as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read import plan: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON import plan: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Invalid TOML import plan: {}", path.display()))
        }
    }

    pub fn map_column(mut self, field: CanonicalField, header: impl Into<String>) -> Self {
        self.column_mapping.insert(field, Some(header.into()));
        self
    }

    pub fn constant(mut self, field: CanonicalField, value: impl Into<Value>) -> Self {
        self.constants.insert(field, value.into());
        self
    }

    pub fn substitute(mut self, field: CanonicalField, table: SubstitutionTable) -> Self {
        self.substitutions.insert(field, table);
        self
    }

    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    /// Header mapped to a field, ignoring blank entries
    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        self.column_mapping
            .get(&field)
            .and_then(|h| h.as_deref())
            .filter(|h| !h.trim().is_empty())
    }

    /// Whether rows can get a title at all
    pub fn has_title_source(&self) -> bool {
        self.constants.contains_key(&CanonicalField::Title) || self.column(CanonicalField::Title).is_some()
    }
}

/// Resolve one row into a candidate record
///
/// No type checking happens here; values are validated when written.
pub fn resolve_row(row: &Row, plan: &ImportPlan) -> CandidateRecord {
    CanonicalField::ALL
        .iter()
        .map(|field| (*field, resolve_field(row, plan, *field)))
        .collect()
}

fn resolve_field(row: &Row, plan: &ImportPlan, field: CanonicalField) -> Value {
    // 1. Constant
    if let Some(value) = plan.constants.get(&field) {
        return value.clone();
    }

    // 2. Mapped column, through the substitution table when present
    let Some(header) = plan.column(field) else {
        return Value::Null;
    };
    let raw = row.value(header);
    match plan.substitutions.get(&field) {
        Some(table) => table
            .lookup(&raw, row.color(header))
            .cloned()
            .unwrap_or(raw),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::Cell;

    fn make_row() -> Row {
        Row::new()
            .with("Juego", Cell::new("Hades"))
            .with("Nota", Cell::colored(9i64, "00FF00"))
            .with("Lista", Cell::colored("x", "ff0000"))
            .with("Horas", Cell::new(Value::Null))
    }

    #[test]
    fn test_constant_wins_over_column() {
        let plan = ImportPlan::default()
            .map_column(CanonicalField::Platform, "Juego")
            .constant(CanonicalField::Platform, "Switch");
        let record = resolve_row(&make_row(), &plan);
        assert_eq!(record.get(CanonicalField::Platform), Some(&Value::from("Switch")));
    }

    #[test]
    fn test_column_passes_raw_value() {
        let plan = ImportPlan::default()
            .map_column(CanonicalField::Title, "Juego")
            .map_column(CanonicalField::Rating, "Nota");
        let record = resolve_row(&make_row(), &plan);
        assert_eq!(record.title(), Some("Hades".to_string()));
        assert_eq!(record.get(CanonicalField::Rating), Some(&Value::Int(9)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_value_key_checked_before_color() {
        let table = SubstitutionTable::default()
            .with_value("9", 10i64)
            .with_color("00FF00", 1i64);
        let plan = ImportPlan::default()
            .map_column(CanonicalField::Rating, "Nota")
            .substitute(CanonicalField::Rating, table);
        let record = resolve_row(&make_row(), &plan);
        assert_eq!(record.get(CanonicalField::Rating), Some(&Value::Int(10)));
    }

    #[test]
    fn test_color_key_used_when_value_misses() {
        let table = SubstitutionTable::default().with_color("FF0000", "finished");
        let plan = ImportPlan::default()
            .map_column(CanonicalField::Status, "Lista")
            .substitute(CanonicalField::Status, table);
        let record = resolve_row(&make_row(), &plan);
        assert_eq!(record.get(CanonicalField::Status), Some(&Value::from("finished")));
    }

    #[test]
    fn test_substitution_miss_keeps_raw_value() {
        let table = SubstitutionTable::default().with_value("nope", 1i64);
        let plan = ImportPlan::default()
            .map_column(CanonicalField::Rating, "Nota")
            .substitute(CanonicalField::Rating, table);
        let record = resolve_row(&make_row(), &plan);
        assert_eq!(record.get(CanonicalField::Rating), Some(&Value::Int(9)));
    }

    #[test]
    fn test_null_and_missing_columns_left_unset() {
        let plan = ImportPlan::default()
            .map_column(CanonicalField::PlaytimeHours, "Horas")
            .map_column(CanonicalField::Notes, "Notas");
        let record = resolve_row(&make_row(), &plan);
        assert!(record.is_empty());
    }

    #[test]
    fn test_plan_from_toml_and_json() {
        let toml_plan: ImportPlan = toml::from_str(
            r#"
            merge_strategy = "overwrite"

            [column_mapping]
            title = "Juego"
            rating = "Nota"

            [constants]
            status = "finished"

            [substitutions.status.by_color]
            "00FF00" = "finished"
            "#,
        )
        .unwrap();
        assert_eq!(toml_plan.merge_strategy, MergeStrategy::Overwrite);
        assert_eq!(toml_plan.column(CanonicalField::Title), Some("Juego"));
        assert!(toml_plan.has_title_source());

        let json_plan: ImportPlan = serde_json::from_str(
            r#"{"column_mapping": {"title": null}, "constants": {"title": "Celeste"}}"#,
        )
        .unwrap();
        assert_eq!(json_plan.column(CanonicalField::Title), None);
        assert!(json_plan.has_title_source());
        assert_eq!(json_plan.merge_strategy, MergeStrategy::Fill);
        assert!(!ImportPlan::default().has_title_source());
    }
}
