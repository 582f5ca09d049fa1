//! In-memory spreadsheet representation

use serde::{Deserialize, Serialize};

use super::Value;

/// Prefix of synthesized names for header cells without text
pub const UNNAMED_PREFIX: &str = "Unnamed:";

/// One spreadsheet cell: its value and, for solid fills, its RGB color
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: Value,
    /// Six hex digits, no alpha channel
    pub color: Option<String>,
}

impl Cell {
    pub fn new(value: impl Into<Value>) -> Self {
        Cell {
            value: value.into(),
            color: None,
        }
    }

    pub fn colored(value: impl Into<Value>, color: impl Into<String>) -> Self {
        Cell {
            value: value.into(),
            color: Some(color.into()),
        }
    }
}

/// A data row keyed by header name, in sheet column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell; a repeated header keeps the later cell
    pub fn insert(&mut self, header: impl Into<String>, cell: Cell) {
        let header = header.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some((_, existing)) => *existing = cell,
            None => self.cells.push((header, cell)),
        }
    }

    /// Builder form of [`Row::insert`]
    pub fn with(mut self, header: impl Into<String>, cell: Cell) -> Self {
        self.insert(header, cell);
        self
    }

    pub fn get(&self, header: &str) -> Option<&Cell> {
        self.cells.iter().find(|(h, _)| h == header).map(|(_, c)| c)
    }

    /// Headers and cells in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(h, c)| (h.as_str(), c))
    }

    /// Cell value under `header`, null when missing
    pub fn value(&self, header: &str) -> Value {
        self.get(header)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Cell color under `header`
    pub fn color(&self, header: &str) -> Option<&str> {
        self.get(header).and_then(|c| c.color.as_deref())
    }
}

/// A worksheet: ordered headers plus its non-empty data rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Headers that carry real text (synthesized `Unnamed:N` excluded)
    pub fn named_headers(&self) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| !is_unnamed(h))
            .cloned()
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Check whether a header name was synthesized for an empty header cell
pub fn is_unnamed(header: &str) -> bool {
    header.starts_with(UNNAMED_PREFIX)
}

/// Synthesize a header name for the 1-based column `column`
pub fn unnamed_header(column: usize) -> String {
    format!("{}{}", UNNAMED_PREFIX, column)
}
