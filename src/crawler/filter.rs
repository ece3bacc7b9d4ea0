use crate::card::CardRecord;
use crate::config::Config;
use std::collections::BTreeSet;
use std::time::Duration;

/// Run-wide constraints on what is kept and how fast pages are fetched
///
/// Immutable for the duration of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlFilter {
    /// Expansion codes to keep (upper-cased); empty keeps everything
    expansions: BTreeSet<String>,

    /// Maximum number of records to output
    pub limit: Option<usize>,

    /// Minimum time between two outbound requests
    pub delay: Duration,
}

impl CrawlFilter {
    pub fn new<I, S>(expansions: I, limit: Option<usize>, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            expansions: expansions
                .into_iter()
                .map(|code| normalize_code(code.as_ref()))
                .filter(|code| !code.is_empty())
                .collect(),
            limit,
            delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.crawl.only_expansions,
            config.crawl.limit(),
            config.fetch.delay(),
        )
    }

    /// Returns true if the record passes the expansion allow-list
    ///
    /// With an allow-list set, records without an expansion code are dropped.
    pub fn allows(&self, record: &CardRecord) -> bool {
        if self.expansions.is_empty() {
            return true;
        }

        record
            .expansion
            .as_deref()
            .is_some_and(|code| self.allows_expansion(code))
    }

    /// Returns true if an expansion code passes the allow-list
    pub fn allows_expansion(&self, code: &str) -> bool {
        self.expansions.is_empty() || self.expansions.contains(&normalize_code(code))
    }

    pub fn has_allow_list(&self) -> bool {
        !self.expansions.is_empty()
    }

    /// Allow-listed codes in sorted order
    pub fn expansions(&self) -> impl Iterator<Item = &str> {
        self.expansions.iter().map(String::as_str)
    }

    /// Returns true once `kept` records satisfy the limit
    pub fn limit_reached(&self, kept: usize) -> bool {
        self.limit.is_some_and(|limit| kept >= limit)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
