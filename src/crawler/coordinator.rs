//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives the fetch/parse loop across all seed URLs:
//! - Resolving each seed's pagination mode
//! - Walking pages in order until exhaustion, a page with no new card
//!   numbers, or the record limit
//! - Deduplicating by card number (first occurrence wins) and applying the
//!   expansion allow-list before the limit is counted
//! - Isolating failures so one broken seed never aborts its siblings

use crate::card::CardRecord;
use crate::config::FetchConfig;
use crate::crawler::detail::EnrichStats;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::filter::CrawlFilter;
use crate::crawler::parser::{parse_page, PageResult};
use crate::crawler::PaginationMode;
use crate::state::{SearchTarget, TargetState};
use crate::url::parse_seed;
use crate::{CardlistError, Result};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// How often and how patiently transient fetch failures are retried
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,

    /// Wait before the first retry; doubled for every further retry
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_retries, config.retry_backoff())
    }

    /// Wait before retry number `attempt` (0-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Fetches a URL, retrying transient failures per the policy
///
/// Every attempt goes through the fetcher, so the run-wide delay still applies
/// on top of the backoff.
pub async fn fetch_with_retry(
    fetcher: &mut Fetcher,
    policy: &RetryPolicy,
    url: &Url,
) -> Result<String> {
    let mut attempt = 0;

    loop {
        match fetcher.fetch(url).await {
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let wait = policy.backoff_for(attempt);
                attempt += 1;
                tracing::warn!(
                    "{} (attempt {}/{}), retrying in {:?}",
                    e,
                    attempt,
                    policy.max_retries + 1,
                    wait
                );
                tokio::time::sleep(wait).await;
            }
            result => return result,
        }
    }
}

/// What happened to one seed URL
#[derive(Debug, Clone, PartialEq)]
pub struct SeedReport {
    pub seed: String,

    /// None when the seed could not be classified
    pub mode: Option<PaginationMode>,

    pub state: TargetState,
    pub pages_fetched: u32,
    pub records_added: usize,
    pub error: Option<String>,
}

impl SeedReport {
    fn from_target(seed: &str, target: &SearchTarget) -> Self {
        Self {
            seed: seed.to_string(),
            mode: Some(target.mode),
            state: target.state,
            pages_fetched: target.pages_fetched,
            records_added: target.records_added,
            error: target.last_error.clone(),
        }
    }

    fn rejected(seed: &str, error: &CardlistError) -> Self {
        Self {
            seed: seed.to_string(),
            mode: None,
            state: TargetState::Failed,
            pages_fetched: 0,
            records_added: 0,
            error: Some(error.to_string()),
        }
    }

    fn skipped(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            mode: None,
            state: TargetState::LimitReached,
            pages_fetched: 0,
            records_added: 0,
            error: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.state == TargetState::Failed
    }
}

/// Result of a crawl: the final record set plus one report per seed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlOutcome {
    /// Deduplicated, filtered, limited records in first-seen order
    pub records: Vec<CardRecord>,

    pub seeds: Vec<SeedReport>,

    /// Outbound requests made during the run
    pub requests: u32,

    /// Counters of the detail pass, when one ran
    pub details: Option<EnrichStats>,
}

impl CrawlOutcome {
    /// Returns true if at least one seed was given and every one of them failed
    pub fn all_seeds_failed(&self) -> bool {
        !self.seeds.is_empty() && self.seeds.iter().all(SeedReport::failed)
    }

    /// Total pages fetched across all seeds
    pub fn pages_fetched(&self) -> u32 {
        self.seeds.iter().map(|s| s.pages_fetched).sum()
    }

    /// The error describing an empty run, or None when records were produced
    pub fn no_records_error(&self) -> Option<CardlistError> {
        if self.records.is_empty() {
            Some(CardlistError::NoRecords {
                all_seeds_failed: self.all_seeds_failed(),
            })
        } else {
            None
        }
    }
}

/// Main crawler coordinator structure
///
/// Holds the run's accumulator: the set of card numbers seen so far and the
/// ordered list of kept records. Nothing else carries state across pages.
pub struct Coordinator {
    fetcher: Fetcher,
    filter: CrawlFilter,
    retry: RetryPolicy,
    seen: HashSet<String>,
    records: Vec<CardRecord>,
}

impl Coordinator {
    /// Creates a coordinator
    ///
    /// The filter's delay becomes the fetcher's minimum delay between requests.
    pub fn new(mut fetcher: Fetcher, filter: CrawlFilter, retry: RetryPolicy) -> Self {
        fetcher.set_min_delay(filter.delay);
        Self {
            fetcher,
            filter,
            retry,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Crawls every seed in order and returns the merged result
    ///
    /// Seed failures are recorded in the outcome, never returned as errors.
    pub async fn run(&mut self, seeds: &[String]) -> CrawlOutcome {
        let start_time = std::time::Instant::now();
        let mut reports = Vec::with_capacity(seeds.len());

        for seed in seeds {
            if self.filter.limit_reached(self.records.len()) {
                tracing::info!("Record limit reached, skipping seed {}", seed);
                reports.push(SeedReport::skipped(seed));
                continue;
            }

            let mut target = match resolve_target(seed) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!("Skipping seed {}: {}", seed, e);
                    reports.push(SeedReport::rejected(seed, &e));
                    continue;
                }
            };

            tracing::info!("Crawling {} ({} pagination)", target.seed, target.mode);
            self.crawl_target(&mut target).await;
            tracing::info!(
                "Seed {} finished: {}, {} pages, {} records",
                target.seed,
                target.state,
                target.pages_fetched,
                target.records_added
            );

            reports.push(SeedReport::from_target(seed, &target));
        }

        tracing::info!(
            "Crawl completed: {} records from {} seeds in {:?}",
            self.records.len(),
            reports.len(),
            start_time.elapsed()
        );

        CrawlOutcome {
            records: std::mem::take(&mut self.records),
            seeds: reports,
            requests: self.fetcher.requests_made(),
            details: None,
        }
    }

    /// Walks one target's pages until it reaches a terminal state
    async fn crawl_target(&mut self, target: &mut SearchTarget) {
        while target.state.is_active() {
            let url = target.current_url();
            tracing::info!("Fetching page {} of {}", target.cursor, target.seed);

            let page = match self.fetch_page(&url, target.mode, target.cursor).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Stopping {} at page {}: {}", target.seed, target.cursor, e);
                    target.fail(e);
                    break;
                }
            };

            target.record_page(page.max_page);
            let (new_ids, added) = self.absorb(page.records);
            target.records_added += added;
            tracing::debug!(
                "Page {} of {}: {} new card numbers, {} records kept",
                target.cursor,
                target.seed,
                new_ids,
                added
            );

            if self.filter.limit_reached(self.records.len()) {
                target.finish(TargetState::LimitReached);
            } else if new_ids == 0 {
                tracing::info!(
                    "Page {} of {} had no new card numbers, stopping",
                    target.cursor,
                    target.seed
                );
                target.finish(TargetState::Exhausted);
            } else {
                target.advance();
            }
        }
    }

    async fn fetch_page(
        &mut self,
        url: &Url,
        mode: PaginationMode,
        cursor: u32,
    ) -> Result<PageResult> {
        let body = fetch_with_retry(&mut self.fetcher, &self.retry, url).await?;
        if mode.is_end_of_results(cursor, &body) {
            tracing::debug!("Empty fragment at page {} ({}), no more results", cursor, url);
            return Ok(PageResult::default());
        }
        parse_page(&body, url, mode)
    }

    /// Folds one page's records into the accumulator
    ///
    /// Returns (card numbers not seen before, records kept). Every new card
    /// number is remembered, even when the allow-list drops the record, so
    /// the safety stop is not fooled by filtered pages.
    fn absorb(&mut self, records: Vec<CardRecord>) -> (usize, usize) {
        let mut new_ids = 0;
        let mut added = 0;

        for record in records {
            if !self.seen.insert(record.cardno.clone()) {
                continue;
            }
            new_ids += 1;

            if !self.filter.allows(&record) || self.filter.limit_reached(self.records.len()) {
                continue;
            }

            self.records.push(record);
            added += 1;
        }

        (new_ids, added)
    }

    /// Gives back the fetcher, for passes that follow the crawl
    pub fn into_fetcher(self) -> Fetcher {
        self.fetcher
    }
}

fn resolve_target(seed: &str) -> Result<SearchTarget> {
    let url = parse_seed(seed)?;
    let mode = PaginationMode::resolve(&url)?;
    Ok(SearchTarget::new(url, mode))
}
