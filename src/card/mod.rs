//! Card data model
//!
//! This module defines the structured representation of one card:
//!
//! - `CardRecord`: the record written to the output file, keyed by card number
//! - `CardRecordBuilder`: best-effort assembly from individually extracted fields
//! - `CardField`: the optional attributes, with mapping from on-page labels

mod field;
mod record;

pub use field::CardField;
pub use record::{expansion_from_cardno, CardRecord, CardRecordBuilder};
