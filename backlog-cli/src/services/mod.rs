// Business logic services layer
//
// Reusable scoring and matching logic shared by the import engine and the CLI.

pub mod matching;
pub mod similarity;
