//! URL handling module
//!
//! This module provides seed URL validation, link resolution, query-string
//! manipulation for page cursors, search-query normalization and card-number
//! extraction.

mod cardno;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use cardno::cardno_from_href;
pub use normalize::{normalize_array_key, normalize_search_query};

/// Parses and validates a seed URL
///
/// Only absolute HTTP(S) URLs with a host are accepted.
///
/// # Examples
///
/// ```
/// use sve_cardlist::url::parse_seed;
///
/// let url = parse_seed("https://shadowverse-evolve.com/cardlist/?expansion_name=BP01").unwrap();
/// assert_eq!(url.path(), "/cardlist/");
/// assert!(parse_seed("ftp://example.com/cardlist/").is_err());
/// ```
pub fn parse_seed(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be ignored:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - invalid URLs or non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}

/// Returns the first value of a query parameter
pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Returns a copy of `url` with `key` set to `value`
///
/// Existing occurrences of `key` are removed; every other parameter keeps its
/// position, and the new pair is appended at the end.
///
/// # Examples
///
/// ```
/// use sve_cardlist::url::set_query_param;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/cardlist/?page=1&class%5B%5D=all").unwrap();
/// let next = set_query_param(&url, "page", "2");
/// assert_eq!(next.as_str(), "https://example.com/cardlist/?class%5B%5D=all&page=2");
/// ```
pub fn set_query_param(url: &Url, key: &str, value: &str) -> Url {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    with_query_pairs(url, &retained, Some((key, value)))
}

/// Returns a copy of `url` whose query is exactly `pairs` (plus `extra`)
pub fn with_query_pairs(url: &Url, pairs: &[(String, String)], extra: Option<(&str, &str)>) -> Url {
    let mut out = url.clone();
    out.set_query(None);

    if pairs.is_empty() && extra.is_none() {
        return out;
    }

    {
        let mut serializer = out.query_pairs_mut();
        for (k, v) in pairs {
            serializer.append_pair(k, v);
        }
        if let Some((k, v)) = extra {
            serializer.append_pair(k, v);
        }
    }

    out
}
