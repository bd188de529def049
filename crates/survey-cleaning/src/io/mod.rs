//! Reading the raw export and writing the cleaned outputs.
//!
//! Outputs are written to a temporary file next to the destination and
//! renamed into place once complete, so a failed write never leaves a
//! truncated file behind.

mod reader;
mod writer;

pub use reader::read_table;
pub use writer::{ensure_parent_dir, write_csv, write_spreadsheet};
