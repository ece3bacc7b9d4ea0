//! Output module for persisting harvested cards
//!
//! This module handles:
//! - Writing the final record set as TSV (and reading it back)
//! - The sink interface the binary writes through
//! - The end-of-run summary printed to stdout

pub mod stats;
mod traits;
mod tsv;

pub use stats::{print_summary, RunSummary};
pub use traits::RecordSink;
pub use tsv::{escape_field, read_tsv, unescape_field, write_tsv, TsvWriter, COLUMNS};
