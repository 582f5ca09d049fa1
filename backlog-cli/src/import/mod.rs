//! Spreadsheet import pipeline
//!
//! ingest (`excel`) → propose (`mapping`) → resolve (`resolve`) or extract →
//! match and reconcile (`engine`)

pub mod analyze;
pub mod engine;
pub mod excel;
pub mod mapping;
pub mod resolve;
mod types;

pub use types::*;
