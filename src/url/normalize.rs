use url::Url;

/// Query parameters dropped when carrying a search over to the scroll endpoint
const CURSOR_PARAMS: &[&str] = &["page"];

/// Normalizes a search URL's query for reuse on the infinite-scroll endpoint
///
/// # Normalization Steps
///
/// 1. Decode the query into ordered key/value pairs (blank values kept)
/// 2. Rewrite indexed array keys (`class[0]`, `cost[12]`) to their bare form
///    (`class[]`, `cost[]`); the scroll endpoint only understands the bare form
/// 3. Drop cursor parameters (`page`), which the caller sets per page
/// 4. Drop exact duplicate pairs, keeping the first occurrence
///
/// Pair order is otherwise preserved so that generated URLs are deterministic.
///
/// # Examples
///
/// ```
/// use sve_cardlist::url::normalize_search_query;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/cardlist/cardsearch/?class%5B0%5D=elf&page=2").unwrap();
/// let pairs = normalize_search_query(&url);
/// assert_eq!(pairs, vec![("class[]".to_string(), "elf".to_string())]);
/// ```
pub fn normalize_search_query(url: &Url) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (key, value) in url.query_pairs() {
        let key = normalize_array_key(&key);
        if CURSOR_PARAMS.contains(&key.as_str()) {
            continue;
        }

        let pair = (key, value.into_owned());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }

    pairs
}

/// Rewrites an indexed array key (`name[3]`) to its bare form (`name[]`)
///
/// Keys that are not of the form `name[digits]` are returned unchanged.
pub fn normalize_array_key(key: &str) -> String {
    if let Some(open) = key.rfind('[') {
        if let Some(index) = key[open + 1..].strip_suffix(']') {
            if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                return format!("{}[]", &key[..open]);
            }
        }
    }

    key.to_string()
}
