use regex::Regex;
use std::sync::LazyLock;

// Card numbers may carry lowercase or underscore suffixes (`BP01-001a`)
static CARDNO_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cardno=([A-Za-z0-9_\-]+)").expect("hardcoded regex is valid"));

/// Extracts the card number from a link carrying a `cardno=` parameter
///
/// # Examples
///
/// ```
/// use sve_cardlist::url::cardno_from_href;
///
/// assert_eq!(
///     cardno_from_href("/cardlist/?cardno=BP01-001&view=text"),
///     Some("BP01-001".to_string())
/// );
/// assert_eq!(cardno_from_href("/cardlist/?page=2"), None);
/// ```
pub fn cardno_from_href(href: &str) -> Option<String> {
    CARDNO_PARAM
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
