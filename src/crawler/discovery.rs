//! Expansion discovery
//!
//! With no seed URL given, the harvester reads the expansion selector of the
//! card-list index page and crawls one search per expansion.

use crate::crawler::coordinator::{fetch_with_retry, RetryPolicy};
use crate::crawler::extract::selector;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::filter::CrawlFilter;
use crate::url::with_query_pairs;
use crate::Result;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static EXPANSION_OPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"select[name="expansion_name"] option"#));

/// Path of the card-list index page
pub const INDEX_PATH: &str = "/cardlist/";

/// Path of the card search page
pub const SEARCH_PATH: &str = "/cardlist/cardsearch/";

/// Reads expansion codes from the index page's expansion selector
///
/// Empty values and the `ALL` placeholder are skipped; duplicates keep their
/// first position.
///
/// # Example
///
/// ```
/// use sve_cardlist::crawler::extract_expansions;
///
/// let html = r#"<select name="expansion_name">
///     <option value="">ALL</option><option value="ALL">ALL</option>
///     <option value="BP02">BP02</option><option value="BP01">BP01</option>
/// </select>"#;
/// assert_eq!(extract_expansions(html), vec!["BP02", "BP01"]);
/// ```
pub fn extract_expansions(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut codes: Vec<String> = Vec::new();

    for option in document.select(&EXPANSION_OPTION) {
        let value = option.value().attr("value").unwrap_or("").trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            continue;
        }
        if !codes.iter().any(|code| code == value) {
            codes.push(value.to_string());
        }
    }

    codes
}

/// Builds the search seed for one expansion, or the unfiltered search when
/// `code` is None
pub fn search_seed(base: &Url, code: Option<&str>) -> Result<Url> {
    let search = base.join(SEARCH_PATH)?;
    let mut pairs = Vec::new();
    if let Some(code) = code {
        pairs.push(("expansion_name".to_string(), code.to_string()));
    }
    pairs.push(("class[]".to_string(), "all".to_string()));

    Ok(with_query_pairs(&search, &pairs, None))
}

/// Builds seed URLs from the site's expansion list
///
/// # Fallbacks
///
/// | Situation | Seeds |
/// |-----------|-------|
/// | Index lists expansions | One per listed code passing the allow-list |
/// | Allow-list set, index unusable or lists none of its codes | One per allow-listed code |
/// | No allow-list, index unusable | A single unfiltered search |
pub async fn discover_seeds(
    fetcher: &mut Fetcher,
    retry: &RetryPolicy,
    base: &Url,
    filter: &CrawlFilter,
) -> Result<Vec<String>> {
    let index = base.join(INDEX_PATH)?;
    tracing::info!("Discovering expansions from {}", index);

    let listed = match fetch_with_retry(fetcher, retry, &index).await {
        Ok(body) => extract_expansions(&body),
        Err(e) => {
            tracing::warn!("Could not read the expansion list: {}", e);
            Vec::new()
        }
    };

    let mut codes: Vec<String> = listed
        .into_iter()
        .filter(|code| filter.allows_expansion(code))
        .collect();

    if codes.is_empty() && filter.has_allow_list() {
        codes = filter.expansions().map(str::to_string).collect();
    }

    let seeds = if codes.is_empty() {
        tracing::warn!("No expansions found, falling back to an unfiltered search");
        vec![search_seed(base, None)?.to_string()]
    } else {
        tracing::info!("Found {} expansions: {}", codes.len(), codes.join(", "));
        codes
            .iter()
            .map(|code| search_seed(base, Some(code)).map(String::from))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(seeds)
}
