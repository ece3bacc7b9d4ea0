//! End-of-run summary
//!
//! Built from the crawl outcome once the records are written, and printed to
//! stdout (logs go to stderr).

use crate::crawler::{CrawlOutcome, EnrichStats, SeedReport};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Summary of one harvest run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-seed reports, in seed order
    pub seeds: Vec<SeedReport>,

    /// Records written to the output
    pub records_written: usize,

    pub pages_fetched: u32,

    /// All outbound requests, including retries, detail and index pages
    pub requests: u32,

    pub details: Option<EnrichStats>,

    pub output: PathBuf,

    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(outcome: &CrawlOutcome, output: &Path, elapsed: Duration) -> Self {
        Self {
            seeds: outcome.seeds.clone(),
            records_written: outcome.records.len(),
            pages_fetched: outcome.pages_fetched(),
            requests: outcome.requests,
            details: outcome.details,
            output: output.to_path_buf(),
            elapsed,
        }
    }

    /// Number of seeds that ended in the failed state
    pub fn seeds_failed(&self) -> usize {
        self.seeds.iter().filter(|s| s.failed()).count()
    }

    /// Renders the summary as printed by `print_summary`
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "=== Harvest Summary ===\n");
        let _ = writeln!(
            out,
            "Seeds ({}, {} failed):",
            self.seeds.len(),
            self.seeds_failed()
        );
        for seed in &self.seeds {
            let mode = seed
                .mode
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = write!(
                out,
                "  [{}] {} {}: {} pages, {} cards",
                seed.state, mode, seed.seed, seed.pages_fetched, seed.records_added
            );
            if let Some(error) = &seed.error {
                let _ = write!(out, " ({})", error);
            }
            out.push('\n');
        }
        out.push('\n');

        let _ = writeln!(out, "Pages fetched: {}", self.pages_fetched);
        let _ = writeln!(out, "Requests sent: {}", self.requests);
        if let Some(details) = &self.details {
            let _ = writeln!(
                out,
                "Detail pass: {} enriched, {} failed, {} already complete",
                details.enriched, details.failed, details.skipped
            );
        }
        let _ = writeln!(
            out,
            "Cards written: {} -> {}",
            self.records_written,
            self.output.display()
        );
        let _ = writeln!(out, "Elapsed: {:.1}s", self.elapsed.as_secs_f64());

        out
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &RunSummary) {
    print!("{}", summary.render());
}
