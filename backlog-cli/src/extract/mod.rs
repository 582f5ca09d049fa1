//! Row-to-record extraction collaborator

mod chat;

pub use chat::{ChatExtractor, ChatExtractorConfig};

use anyhow::Result;
use async_trait::async_trait;

use crate::import::{CandidateRecord, GameStatus, Row, Value};

/// One spreadsheet row, flattened for the extractor
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub headers: Vec<String>,
    pub values: Vec<Value>,
    pub target_status: GameStatus,
    pub instructions: Option<String>,
    /// Cell colors aligned with `values`
    pub colors: Vec<Option<String>>,
}

impl ExtractionRequest {
    /// Flatten `row` in `headers` order
    pub fn from_row(
        headers: &[String],
        row: &Row,
        target_status: GameStatus,
        instructions: Option<&str>,
    ) -> Self {
        ExtractionRequest {
            headers: headers.to_vec(),
            values: headers.iter().map(|h| row.value(h)).collect(),
            target_status,
            instructions: instructions.map(String::from),
            colors: headers
                .iter()
                .map(|h| row.color(h).map(String::from))
                .collect(),
        }
    }
}

/// Turns a raw row into a typed candidate record
///
/// `Ok(None)` means the row held nothing extractable. Implementations return
/// records whose values already satisfy the field types, with `status` set
/// to the requested target status.
#[async_trait]
pub trait RowExtractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<Option<CandidateRecord>>;
}
