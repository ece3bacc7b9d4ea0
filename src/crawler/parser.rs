//! Card-list page parser
//!
//! This module turns the markup of one result page into:
//! - One `CardRecord` per card block, in page order
//! - The page bound used for pagination (classic pager or embedded `max_page`)

use crate::card::{CardField, CardRecord, CardRecordBuilder};
use crate::crawler::extract::{
    ability_text, collapsed_text, data_attributes, first_attr, first_text, labelled_fields,
    selector, status_numbers,
};
use crate::crawler::PaginationMode;
use crate::url::{cardno_from_href, query_param, resolve_link};
use crate::{CardlistError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li"));
static CARD_LINK: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="cardno="]"#));
static DATA_CARDNO: LazyLock<Selector> = LazyLock::new(|| selector("[data-cardno]"));
static CARD_NAME: LazyLock<Selector> = LazyLock::new(|| {
    selector(".ttl, .name, .card-Name, .cardName, .cardlist-Result_Name, h2, h3, h4")
});
static CARD_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img[alt]"));
static ABILITY_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
    selector(".detail, .Ability, .CardText, .card-Ability, .cardtext, .ability")
});
// `page` only as a whole class token; `page-cardlist` on <body> is not a pager
static PAGER: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[class*="pager"], [class*="pagination"], [class~="page"]"#));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static MAX_PAGE_ATTR: LazyLock<Selector> =
    LazyLock::new(|| selector("[data-max-page], [data-max_page]"));

// max_page = 7 / max_page: 7 / "max_page":"7"
static MAX_PAGE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?max_page["']?\s*[:=]\s*["']?(\d+)"#).expect("hardcoded regex is valid")
});

/// Records and pagination bound extracted from one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Card records in page order (not deduplicated)
    pub records: Vec<CardRecord>,

    /// Highest page number the page reports; None means "no more pages"
    pub max_page: Option<u32>,
}

/// Parses one result page
///
/// # Card Blocks
///
/// A card block is a list item carrying a `data-cardno` attribute or holding a
/// link with a `cardno=` parameter. When list items nest, only the innermost
/// qualifying item counts, so a card is never counted twice. Pages without
/// such list items fall back to bare `cardno=` links, one record per card.
///
/// # Errors
///
/// `Parse` only when the body is not markup at all (empty, or e.g. JSON).
/// A page with no recognizable card blocks yields an empty result.
///
/// # Example
///
/// ```
/// use sve_cardlist::crawler::parse_page;
/// use sve_cardlist::PaginationMode;
/// use url::Url;
///
/// let html = r#"<ul><li><a href="/cardlist/?cardno=BP01-001">Sylvan Archer</a></li></ul>"#;
/// let url = Url::parse("https://shadowverse-evolve.com/cardlist/").unwrap();
/// let page = parse_page(html, &url, PaginationMode::Classic).unwrap();
/// assert_eq!(page.records[0].cardno, "BP01-001");
/// assert_eq!(page.max_page, None);
/// ```
pub fn parse_page(html: &str, page_url: &Url, mode: PaginationMode) -> Result<PageResult> {
    ensure_markup(html, page_url)?;

    let document = Html::parse_document(html);
    let records = extract_records(&document, page_url);
    let max_page = page_bound(&document, html, page_url, mode);

    tracing::trace!(
        "{}: {} card blocks, max_page {:?}",
        page_url,
        records.len(),
        max_page
    );

    Ok(PageResult { records, max_page })
}

/// Page bound for the given pagination mode
pub(crate) fn page_bound(
    document: &Html,
    html: &str,
    page_url: &Url,
    mode: PaginationMode,
) -> Option<u32> {
    match mode {
        PaginationMode::Classic => classic_max_page(document, page_url),
        PaginationMode::InfiniteScroll => embedded_max_page(document, html),
    }
}

/// Rejects bodies that cannot be a card-list page
pub(crate) fn ensure_markup(html: &str, page_url: &Url) -> Result<()> {
    let trimmed = html.trim_start_matches('\u{feff}').trim();

    let message = if trimmed.is_empty() {
        "empty body"
    } else if !trimmed.starts_with('<') {
        "body is not HTML markup"
    } else {
        return Ok(());
    };

    Err(CardlistError::Parse {
        url: page_url.to_string(),
        message: message.to_string(),
    })
}

fn extract_records(document: &Html, page_url: &Url) -> Vec<CardRecord> {
    let blocks = card_blocks(document);
    if !blocks.is_empty() {
        return blocks
            .into_iter()
            .filter_map(|block| parse_card_block(block, page_url))
            .collect();
    }

    records_from_links(document, page_url)
}

/// Innermost list items that identify a card
pub(crate) fn card_blocks(document: &Html) -> Vec<ElementRef<'_>> {
    let candidates: Vec<ElementRef> = document
        .select(&LIST_ITEM)
        .filter(|li| is_card_block(*li))
        .collect();

    let outer: HashSet<_> = candidates
        .iter()
        .flat_map(|li| li.ancestors().filter_map(ElementRef::wrap))
        .filter(|ancestor| ancestor.value().name() == "li")
        .map(|ancestor| ancestor.id())
        .collect();

    candidates
        .into_iter()
        .filter(|li| !outer.contains(&li.id()))
        .collect()
}

fn is_card_block(li: ElementRef) -> bool {
    li.value().attr("data-cardno").is_some() || li.select(&CARD_LINK).next().is_some()
}

/// Card number of a block, from `data-cardno` or its card link
pub(crate) fn block_cardno(block: ElementRef) -> Option<String> {
    first_attr(block, &DATA_CARDNO, "data-cardno").or_else(|| {
        block
            .select(&CARD_LINK)
            .find_map(|a| a.value().attr("href").and_then(cardno_from_href))
    })
}

/// Builds one record from a card block, field by field
fn parse_card_block(block: ElementRef, page_url: &Url) -> Option<CardRecord> {
    let link = block.select(&CARD_LINK).next();
    let href = link.and_then(|a| a.value().attr("href"));

    let mut builder = CardRecordBuilder::new();
    builder
        .cardno(first_attr(block, &DATA_CARDNO, "data-cardno"))
        .cardno(href.and_then(cardno_from_href))
        .url(href.and_then(|h| resolve_link(h, page_url)).map(String::from))
        .field(CardField::Name, card_name(block, link));

    for (field, value) in data_attributes(block) {
        builder.field(field, Some(value));
    }
    for (field, value) in labelled_fields(block) {
        builder.field(field, Some(value));
    }
    for (field, value) in status_numbers(block) {
        builder.field(field, Some(value));
    }
    if let Some(ability) = block.select(&ABILITY_BLOCK).find_map(ability_text) {
        builder.field(CardField::Ability, Some(ability));
    }

    if !builder.has_cardno() {
        tracing::debug!("Skipping card block without a card number on {}", page_url);
    }
    builder.build()
}

/// Name from a title element, then the card image's alt, then the link
fn card_name(block: ElementRef, link: Option<ElementRef>) -> Option<String> {
    first_text(block, &CARD_NAME)
        .or_else(|| first_attr(block, &CARD_IMAGE, "alt"))
        .or_else(|| link.and_then(|a| a.value().attr("title")).map(str::to_string))
        .or_else(|| link.map(collapsed_text).filter(|text| !text.is_empty()))
}

/// Fallback for pages that list cards as bare links
///
/// Several links usually point at the same card (image and name); their
/// evidence is merged into one record per card number.
fn records_from_links(document: &Html, page_url: &Url) -> Vec<CardRecord> {
    let mut records: Vec<CardRecord> = Vec::new();

    for link in document.select(&CARD_LINK) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let mut builder = CardRecordBuilder::new();
        builder
            .cardno(cardno_from_href(href))
            .url(resolve_link(href, page_url).map(String::from))
            .field(CardField::Name, card_name(link, Some(link)));

        let Some(record) = builder.build() else {
            continue;
        };

        match records.iter_mut().find(|r| r.cardno == record.cardno) {
            Some(existing) => {
                existing.fill_missing_from(&record);
            }
            None => records.push(record),
        }
    }

    records
}

/// Largest page number offered by the pagination controls
///
/// Looks at link texts that are plain numbers and at `page=N` parameters of
/// pager links. Missing or malformed controls mean a single page.
fn classic_max_page(document: &Html, page_url: &Url) -> Option<u32> {
    document
        .select(&PAGER)
        .flat_map(|pager| pager.select(&LINK))
        .filter_map(|link| {
            let from_text = collapsed_text(link).parse::<u32>().ok();
            let from_href = link
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, page_url))
                .and_then(|url| query_param(&url, "page"))
                .and_then(|page| page.parse::<u32>().ok());
            from_text.max(from_href)
        })
        .filter(|page| *page >= 1)
        .max()
}

/// `max_page` from a data attribute or an inline script assignment
fn embedded_max_page(document: &Html, html: &str) -> Option<u32> {
    let from_attr = document.select(&MAX_PAGE_ATTR).find_map(|el| {
        el.value()
            .attr("data-max-page")
            .or_else(|| el.value().attr("data-max_page"))
            .and_then(|value| value.trim().parse::<u32>().ok())
    });

    from_attr
        .or_else(|| {
            MAX_PAGE_SCRIPT
                .captures(html)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        })
        .filter(|page| *page >= 1)
}
