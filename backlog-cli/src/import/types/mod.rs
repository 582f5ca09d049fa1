//! Core types for spreadsheet import

mod error;
mod field;
mod record;
mod report;
mod sheet;
mod value;

pub use error::*;
pub use field::*;
pub use record::*;
pub use report::*;
pub use sheet::*;
pub use value::*;
