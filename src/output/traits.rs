//! Output sink trait
//!
//! A sink receives the final, ordered record set of a run. The harvester
//! ships a TSV sink; the trait keeps the binary independent of the format.

use crate::card::CardRecord;
use crate::Result;

/// Destination for a run's records
pub trait RecordSink {
    /// Persists `records` in order, replacing earlier output
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records written
    /// * `Err(CardlistError)` - The destination could not be written
    fn write_records(&mut self, records: &[CardRecord]) -> Result<usize>;

    /// Human-readable destination, used in logs and the run summary
    fn destination(&self) -> String;
}
