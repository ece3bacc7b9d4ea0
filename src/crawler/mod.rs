//! Crawler module for card-list fetching and extraction
//!
//! This module contains the core harvesting logic, including:
//! - Rate-limited HTTP fetching
//! - Card-list page parsing and field extraction
//! - Pagination strategy resolution (classic vs infinite scroll)
//! - Overall crawl coordination, deduplication and filtering
//! - Optional detail-page enrichment and expansion discovery
//! - Search-URL diagnostics (duplicates, links without card numbers)

mod coordinator;
mod detail;
mod discovery;
mod extract;
mod fetcher;
mod filter;
mod inspect;
mod pagination;
mod parser;
mod throttle;

pub use coordinator::{fetch_with_retry, Coordinator, CrawlOutcome, RetryPolicy, SeedReport};
pub use detail::{detail_url, enrich_records, parse_detail_page, EnrichStats};
pub use discovery::{discover_seeds, extract_expansions, search_seed};
pub use fetcher::{build_http_client, Fetcher};
pub use filter::CrawlFilter;
pub use inspect::{inspect_search, DuplicateCardno, InspectReport, DEFAULT_SAMPLE_SIZE};
pub use pagination::{PaginationMode, PAGE_PARAM, SCROLL_ENDPOINT};
pub use parser::{parse_page, PageResult};
pub use throttle::Throttle;

use crate::config::Config;
use crate::Result;
use url::Url;

/// Runs a complete harvest
///
/// This is the main entry point. It will:
/// 1. Build the fetcher from the `[fetch]` settings
/// 2. Use the configured seeds, or discover one seed per expansion
/// 3. Crawl every seed through the coordinator
/// 4. Optionally fill missing fields from detail pages
///
/// Per-seed failures are reported in the outcome. Only setup problems
/// (invalid base URL, HTTP client construction) are returned as errors; an
/// empty outcome is left for the caller to judge.
///
/// # Example
///
/// ```no_run
/// use sve_cardlist::config::Config;
/// use sve_cardlist::crawler::harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawl.seeds = vec!["https://shadowverse-evolve.com/cardlist/cardsearch/?expansion_name=BP01".to_string()];
/// let outcome = harvest(&config).await?;
/// println!("{} cards", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config) -> Result<CrawlOutcome> {
    let filter = CrawlFilter::from_config(config);
    let retry = RetryPolicy::from_config(&config.fetch);
    let base = Url::parse(&config.crawl.base_url)?;
    let mut fetcher = Fetcher::new(&config.fetch)?;

    let seeds = if config.crawl.seeds.is_empty() {
        discover_seeds(&mut fetcher, &retry, &base, &filter).await?
    } else {
        config.crawl.seeds.clone()
    };

    let mut coordinator = Coordinator::new(fetcher, filter, retry);
    let mut outcome = coordinator.run(&seeds).await;

    if config.crawl.details && !outcome.records.is_empty() {
        let mut fetcher = coordinator.into_fetcher();
        let stats = enrich_records(&mut fetcher, &retry, &base, &mut outcome.records).await;
        outcome.details = Some(stats);
        outcome.requests = fetcher.requests_made();
    }

    Ok(outcome)
}
