//! Detail-page enrichment
//!
//! List pages often omit attributes (ability text, hit points, rarity). This
//! optional second pass fetches each incomplete card's detail page and fills
//! the fields that are still empty. Card numbers and record order never
//! change.

use crate::card::{CardField, CardRecord, CardRecordBuilder};
use crate::crawler::coordinator::{fetch_with_retry, RetryPolicy};
use crate::crawler::extract::{ability_text, first_text, labelled_fields, selector, status_numbers};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::ensure_markup;
use crate::url::set_query_param;
use crate::Result;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Name candidates, most specific first
static DETAIL_NAME: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        ".cardlist-Detail .txt > h1.ttl",
        ".cardlist-Detail h1.ttl",
        ".card-Detail_Name",
        ".cardDetail-Name",
        ".CardDetail_Name",
        "h1",
        ".Detail_Title",
    ]
    .into_iter()
    .map(selector)
    .collect()
});
static STATUS: LazyLock<Selector> = LazyLock::new(|| selector(".status"));
static ABILITY: LazyLock<Selector> = LazyLock::new(|| selector(".detail"));
static ABILITY_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| selector(".Ability, .CardText, .card-Ability, .cardtext"));

/// Counters for one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Records that gained at least one field
    pub enriched: usize,

    /// Records whose detail page could not be fetched or parsed
    pub failed: usize,

    /// Records that were already complete and were not fetched
    pub skipped: usize,
}

/// Builds the detail-page URL for a card: `<base>/cardlist/?cardno=<id>`
///
/// # Examples
///
/// ```
/// use sve_cardlist::crawler::detail_url;
/// use url::Url;
///
/// let base = Url::parse("https://shadowverse-evolve.com").unwrap();
/// assert_eq!(
///     detail_url(&base, "BP01-001").unwrap().as_str(),
///     "https://shadowverse-evolve.com/cardlist/?cardno=BP01-001"
/// );
/// ```
pub fn detail_url(base: &Url, cardno: &str) -> Result<Url> {
    let index = base.join("/cardlist/")?;
    Ok(set_query_param(&index, "cardno", cardno))
}

/// Parses a card's detail page into a record carrying `cardno`
///
/// Returns a record with no fields set when the page does not look like a
/// detail page (no name heading and no labelled attributes).
pub fn parse_detail_page(html: &str, page_url: &Url, cardno: &str) -> Result<CardRecord> {
    ensure_markup(html, page_url)?;

    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut builder = CardRecordBuilder::new();
    builder.cardno(Some(cardno.to_string()));

    let name = DETAIL_NAME
        .iter()
        .find_map(|candidate| first_text(root, candidate));

    let labelled = labelled_fields(root);
    if name.is_none() && labelled.is_empty() {
        tracing::debug!("{} does not look like a detail page", page_url);
        return Ok(CardRecord::new(cardno));
    }

    builder.field(CardField::Name, name);
    for (field, value) in labelled {
        builder.field(field, Some(value));
    }

    let ability = root
        .select(&ABILITY)
        .find_map(ability_text)
        .or_else(|| root.select(&ABILITY_FALLBACK).find_map(ability_text));
    builder.field(CardField::Ability, ability);

    for status in root.select(&STATUS) {
        for (field, value) in status_numbers(status) {
            builder.field(field, Some(value));
        }
    }

    builder.url(Some(page_url.to_string()));

    Ok(builder.build().unwrap_or_else(|| CardRecord::new(cardno)))
}

/// Fills empty fields of `records` from their detail pages
///
/// Complete records are not fetched. A failed fetch or parse keeps the
/// list-page record unchanged and is logged.
pub async fn enrich_records(
    fetcher: &mut Fetcher,
    retry: &RetryPolicy,
    base: &Url,
    records: &mut [CardRecord],
) -> EnrichStats {
    let mut stats = EnrichStats::default();
    let total = records.len();

    for (index, record) in records.iter_mut().enumerate() {
        if record.missing_fields().is_empty() && record.url.is_some() {
            stats.skipped += 1;
            continue;
        }

        match fetch_detail(fetcher, retry, base, &record.cardno).await {
            Ok(detail) => {
                let filled = record.fill_missing_from(&detail);
                tracing::debug!(
                    "[{}/{}] {}: filled {} fields",
                    index + 1,
                    total,
                    record.cardno,
                    filled
                );
                if filled > 0 {
                    stats.enriched += 1;
                }
            }
            Err(e) => {
                tracing::warn!("Detail page for {} failed: {}", record.cardno, e);
                stats.failed += 1;
            }
        }
    }

    tracing::info!(
        "Detail pass: {} enriched, {} failed, {} already complete",
        stats.enriched,
        stats.failed,
        stats.skipped
    );

    stats
}

async fn fetch_detail(
    fetcher: &mut Fetcher,
    retry: &RetryPolicy,
    base: &Url,
    cardno: &str,
) -> Result<CardRecord> {
    let url = detail_url(base, cardno)?;
    let body = fetch_with_retry(fetcher, retry, &url).await?;
    parse_detail_page(&body, &url, cardno)
}
