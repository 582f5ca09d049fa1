//! Import error types

use super::CanonicalField;

/// Batch-level failures, reported before any row is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Spreadsheet bytes could not be read as a workbook
    Parse(String),
    /// The requested sheet does not exist or has no data rows
    SheetNotFound(String),
    /// Neither a column nor a constant provides the title
    MissingTitleMapping,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Parse(msg) => write!(f, "could not parse spreadsheet: {}", msg),
            ImportError::SheetNotFound(name) => {
                write!(f, "sheet '{}' not found or empty", name)
            }
            ImportError::MissingTitleMapping => write!(f, "title mapping is required"),
        }
    }
}

impl std::error::Error for ImportError {}

/// A candidate value that does not satisfy the catalog schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowValidationError {
    pub field: CanonicalField,
    pub message: String,
}

impl RowValidationError {
    pub fn new(field: CanonicalField, message: impl Into<String>) -> Self {
        RowValidationError {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RowValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for RowValidationError {}
