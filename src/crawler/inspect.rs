//! Search-result diagnostics
//!
//! Walks one search URL with the same pagination a harvest would use and
//! reports what the harvest has to cope with:
//! - Card numbers listed by more than one card block
//! - Card-list links that carry no `cardno=` parameter
//!
//! Nothing is extracted or written; the report only helps judge whether a
//! search URL (or a changed page layout) still parses the way it should.

use crate::crawler::coordinator::{fetch_with_retry, RetryPolicy};
use crate::crawler::extract::selector;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{block_cardno, card_blocks, ensure_markup, page_bound};
use crate::crawler::PaginationMode;
use crate::state::{SearchTarget, TargetState};
use crate::url::{cardno_from_href, parse_seed, resolve_link};
use crate::Result;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::LazyLock;
use url::Url;

/// Default number of samples kept per report section
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Links kept per duplicated card number
const LINKS_PER_DUPLICATE: usize = 3;

static HREF_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// A card number listed by more than one card block
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCardno {
    pub cardno: String,

    /// Card blocks carrying this number, across all scanned pages
    pub count: usize,

    /// A few of the links pointing at it
    pub links: Vec<String>,
}

/// Findings for one search URL
#[derive(Debug, Clone, PartialEq)]
pub struct InspectReport {
    pub url: String,
    pub mode: PaginationMode,
    pub pages_scanned: u32,
    pub card_blocks: usize,
    pub distinct_cardnos: usize,

    /// Most repeated first, at most `sample` entries
    pub duplicates: Vec<DuplicateCardno>,

    /// Unique `/cardlist/` links without `cardno=`, at most `sample` entries
    pub links_without_cardno: Vec<String>,

    /// Set when a page after the first could not be scanned
    pub error: Option<String>,
}

impl InspectReport {
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "=== Inspect: {} ===\n", self.url);
        let _ = writeln!(out, "Pagination: {}", self.mode);
        let _ = writeln!(out, "Pages scanned: {}", self.pages_scanned);
        let _ = writeln!(
            out,
            "Card blocks: {} ({} distinct card numbers)",
            self.card_blocks, self.distinct_cardnos
        );
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Stopped early: {}", error);
        }

        if self.duplicates.is_empty() {
            let _ = writeln!(out, "\nNo duplicate card numbers found.");
        } else {
            let _ = writeln!(out, "\nDuplicate card numbers (cardno x count):");
            for duplicate in &self.duplicates {
                let _ = writeln!(out, "  - {} x {}", duplicate.cardno, duplicate.count);
                for link in &duplicate.links {
                    let _ = writeln!(out, "      {}", link);
                }
            }
        }

        if self.links_without_cardno.is_empty() {
            let _ = writeln!(out, "\nNo card-list links without cardno= found.");
        } else {
            let _ = writeln!(out, "\nCard-list links without cardno=:");
            for link in &self.links_without_cardno {
                let _ = writeln!(out, "  - {}", link);
            }
        }

        out
    }
}

/// Running counts across the pages of one search URL
#[derive(Debug, Default)]
struct Tally {
    /// Card numbers in first-seen order
    order: Vec<String>,
    counts: HashMap<String, usize>,
    links: HashMap<String, Vec<String>>,
    without_cardno: Vec<String>,
    without_cardno_seen: HashSet<String>,
    blocks: usize,
}

impl Tally {
    /// Counts one page; returns the number of card blocks on it
    fn absorb(&mut self, document: &Html, page_url: &Url) -> usize {
        let blocks = card_blocks(document);

        for cardno in blocks.iter().filter_map(|block| block_cardno(*block)) {
            match self.counts.get_mut(&cardno) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(cardno.clone(), 1);
                    self.order.push(cardno);
                }
            }
        }
        self.blocks += blocks.len();

        for link in document.select(&HREF_LINK) {
            let Some(url) = link
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, page_url))
            else {
                continue;
            };

            match cardno_from_href(url.as_str()) {
                Some(cardno) => {
                    let links = self.links.entry(cardno).or_default();
                    if links.len() < LINKS_PER_DUPLICATE && !links.contains(&url.to_string()) {
                        links.push(url.to_string());
                    }
                }
                None if url.path().contains("/cardlist/") => {
                    if self.without_cardno_seen.insert(url.to_string()) {
                        self.without_cardno.push(url.to_string());
                    }
                }
                None => {}
            }
        }

        blocks.len()
    }

    fn duplicates(&self, sample: usize) -> Vec<DuplicateCardno> {
        let mut duplicates: Vec<DuplicateCardno> = self
            .order
            .iter()
            .filter_map(|cardno| {
                let count = *self.counts.get(cardno)?;
                (count > 1).then(|| DuplicateCardno {
                    cardno: cardno.clone(),
                    count,
                    links: self.links.get(cardno).cloned().unwrap_or_default(),
                })
            })
            .collect();

        duplicates.sort_by(|a, b| b.count.cmp(&a.count));
        duplicates.truncate(sample);
        duplicates
    }

    fn into_report(self, target: &SearchTarget, sample: usize) -> InspectReport {
        let duplicates = self.duplicates(sample);
        let mut links_without_cardno = self.without_cardno;
        links_without_cardno.truncate(sample);

        InspectReport {
            url: target.seed.to_string(),
            mode: target.mode,
            pages_scanned: target.pages_fetched,
            card_blocks: self.blocks,
            distinct_cardnos: self.order.len(),
            duplicates,
            links_without_cardno,
            error: target.last_error.clone(),
        }
    }
}

/// Walks a search URL and reports duplicates and card-number-less links
///
/// Pages are enumerated exactly as in a harvest: the classic pager bound or
/// the infinite-scroll `max_page`. The walk also stops at a page without any
/// card block. Requests go through the fetcher, so the delay applies.
///
/// # Errors
///
/// Returns an error when the URL is not a card-list search or its first page
/// cannot be fetched or parsed. Failures on later pages end the walk and are
/// kept in the report.
pub async fn inspect_search(
    fetcher: &mut Fetcher,
    retry: &RetryPolicy,
    seed: &str,
    sample: usize,
) -> Result<InspectReport> {
    let url = parse_seed(seed)?;
    let mode = PaginationMode::resolve(&url)?;
    let mut target = SearchTarget::new(url, mode);
    let mut tally = Tally::default();

    tracing::info!("Inspecting {} ({} pagination)", target.seed, mode);

    while target.state.is_active() {
        let page_url = target.current_url();

        match scan_page(fetcher, retry, &page_url, mode, target.cursor, &mut tally).await {
            Ok((max_page, 0)) => {
                target.record_page(max_page);
                target.finish(TargetState::Exhausted);
            }
            Ok((max_page, _)) => {
                target.record_page(max_page);
                target.advance();
            }
            Err(e) if target.pages_fetched == 0 => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Stopping inspection of {} at page {}: {}",
                    target.seed,
                    target.cursor,
                    e
                );
                target.fail(e);
            }
        }
    }

    Ok(tally.into_report(&target, sample))
}

/// Fetches and counts one page; returns its bound and card block count
async fn scan_page(
    fetcher: &mut Fetcher,
    retry: &RetryPolicy,
    page_url: &Url,
    mode: PaginationMode,
    cursor: u32,
    tally: &mut Tally,
) -> Result<(Option<u32>, usize)> {
    let body = fetch_with_retry(fetcher, retry, page_url).await?;
    if mode.is_end_of_results(cursor, &body) {
        return Ok((None, 0));
    }
    ensure_markup(&body, page_url)?;

    let document = Html::parse_document(&body);
    let blocks = tally.absorb(&document, page_url);
    tracing::debug!("Inspected page {} of {}: {} card blocks", cursor, page_url, blocks);

    Ok((page_bound(&document, &body, page_url, mode), blocks))
}
