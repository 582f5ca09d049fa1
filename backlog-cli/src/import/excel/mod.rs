//! Spreadsheet ingestion: xlsx bytes to sheets of cells

mod reader;
mod styles;

pub use reader::{find_sheet, read_workbook};
