//! Spreadsheet import and reconciliation for a game backlog catalog

pub mod catalog;
pub mod cli;
pub mod config;
pub mod extract;
pub mod import;
pub mod services;
