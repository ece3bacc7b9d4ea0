//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TargetState`: lifecycle of one seed URL (pending, paging, exhausted, ...)
//! - `SearchTarget`: a seed URL with its pagination mode, cursor and counters

mod search_target;
mod target_state;

// Re-export main types
pub use search_target::SearchTarget;
pub use target_state::TargetState;
