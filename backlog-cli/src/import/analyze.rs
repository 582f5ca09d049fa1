//! Workbook overview used before choosing a sheet and a plan

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use super::excel::read_workbook;
use super::mapping::{MappingProposal, propose_mapping};
use super::{CanonicalField, Sheet};

/// What a sheet holds and how its headers would map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetAnalysis {
    pub name: String,
    pub row_count: usize,
    /// Headers with text; synthesized `Unnamed:N` columns are left out
    pub headers: Vec<String>,
    pub proposals: BTreeMap<CanonicalField, MappingProposal>,
}

impl SheetAnalysis {
    pub fn of(sheet: &Sheet) -> Self {
        SheetAnalysis {
            name: sheet.name.clone(),
            row_count: sheet.row_count(),
            headers: sheet.named_headers(),
            proposals: propose_mapping(&sheet.headers),
        }
    }
}

/// Parse a workbook and describe every non-empty sheet
pub fn analyze_workbook(bytes: &[u8]) -> Result<Vec<SheetAnalysis>> {
    let sheets = read_workbook(bytes)?;
    Ok(sheets.iter().map(SheetAnalysis::of).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_analyze_workbook() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Backlog").unwrap();
        sheet.write_string(0, 0, "Juego").unwrap();
        sheet.write_string(0, 2, "Horas").unwrap();
        sheet.write_string(1, 0, "Hades").unwrap();
        sheet.write_number(1, 1, 3.0).unwrap();
        sheet.write_string(2, 0, "Celeste").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let analysis = analyze_workbook(&bytes).unwrap();
        assert_eq!(analysis.len(), 1);
        let backlog = &analysis[0];
        assert_eq!(backlog.name, "Backlog");
        assert_eq!(backlog.row_count, 2);
        assert_eq!(backlog.headers, vec!["Juego", "Horas"]);
        assert_eq!(
            backlog.proposals[&CanonicalField::Title].selected_header.as_deref(),
            Some("Juego")
        );
        assert_eq!(
            backlog.proposals[&CanonicalField::PlaytimeHours].selected_header.as_deref(),
            Some("Horas")
        );
    }
}
