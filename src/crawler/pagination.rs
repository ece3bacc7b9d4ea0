//! Pagination strategy resolution
//!
//! The card list is served in two layouts. `/cardlist/?...` renders a classic
//! numbered pager. `/cardlist/cardsearch/?...` renders the first batch of
//! results and loads the rest from `/cardlist/cardsearch_ex` as the user
//! scrolls, bounded by a `max_page` value embedded in the first page.

use crate::url::{normalize_search_query, set_query_param, with_query_pairs};
use crate::{CardlistError, Result};
use std::fmt;
use url::Url;

/// Path of the endpoint serving infinite-scroll fragments
pub const SCROLL_ENDPOINT: &str = "/cardlist/cardsearch_ex";

/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "page";

/// How a search target enumerates its pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    /// Numbered pages selected by `page=N` on the seed URL itself
    Classic,

    /// First page at the seed URL, pages 2..=max_page from the scroll endpoint
    InfiniteScroll,
}

impl PaginationMode {
    /// Classifies a seed URL by its path shape
    ///
    /// # Errors
    ///
    /// `UnsupportedSeed` for URLs outside `/cardlist/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sve_cardlist::PaginationMode;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://shadowverse-evolve.com/cardlist/cardsearch/?expansion_name=BP01").unwrap();
    /// assert_eq!(PaginationMode::resolve(&url).unwrap(), PaginationMode::InfiniteScroll);
    ///
    /// let url = Url::parse("https://shadowverse-evolve.com/cardlist/?expansion_name=BP01").unwrap();
    /// assert_eq!(PaginationMode::resolve(&url).unwrap(), PaginationMode::Classic);
    /// ```
    pub fn resolve(url: &Url) -> Result<Self> {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["cardlist", "cardsearch" | "cardsearch_ex", ..] => Ok(Self::InfiniteScroll),
            ["cardlist", ..] => Ok(Self::Classic),
            _ => Err(CardlistError::UnsupportedSeed {
                url: url.to_string(),
            }),
        }
    }

    /// Builds the URL of page `page` (1-based) for a seed
    pub fn page_url(&self, seed: &Url, page: u32) -> Url {
        match self {
            Self::Classic => set_query_param(seed, PAGE_PARAM, &page.to_string()),
            Self::InfiniteScroll if page <= 1 => seed.clone(),
            Self::InfiniteScroll => {
                let mut endpoint = seed.clone();
                endpoint.set_path(SCROLL_ENDPOINT);
                let query = normalize_search_query(seed);
                with_query_pairs(&endpoint, &query, Some((PAGE_PARAM, &page.to_string())))
            }
        }
    }

    /// Returns true if a page after `cursor` should be fetched
    ///
    /// Without a known bound the target is a single page; it is never probed
    /// further.
    pub fn has_next(&self, cursor: u32, max_page: Option<u32>) -> bool {
        max_page.is_some_and(|max| cursor < max)
    }

    /// Returns true if `body` marks the end of the results rather than a broken page
    ///
    /// The scroll endpoint answers past its last batch with an empty fragment.
    /// A blank first page, or a blank classic page, stays a parse failure.
    pub fn is_end_of_results(&self, page: u32, body: &str) -> bool {
        matches!(self, Self::InfiniteScroll)
            && page > 1
            && body.trim_start_matches('\u{feff}').trim().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::InfiniteScroll => "infinite-scroll",
        }
    }
}

impl fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
