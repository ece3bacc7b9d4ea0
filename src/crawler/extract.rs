//! Field-level extractors
//!
//! Each extractor looks for one kind of evidence inside a card block and
//! returns what it found, or nothing. None of them fail: a block missing a
//! field simply yields a record with that field empty.

use crate::card::CardField;
use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use std::sync::LazyLock;

static DEFINITION_LIST: LazyLock<Selector> = LazyLock::new(|| selector("dl"));
static TERM: LazyLock<Selector> = LazyLock::new(|| selector("dt"));
static DEFINITION: LazyLock<Selector> = LazyLock::new(|| selector("dd"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static STATUS_COST: LazyLock<Selector> = LazyLock::new(|| selector(".status-Item-Cost"));
static STATUS_POWER: LazyLock<Selector> = LazyLock::new(|| selector(".status-Item-Power"));
static STATUS_HP: LazyLock<Selector> = LazyLock::new(|| selector(".status-Item-Hp"));

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\r\x0B\x0C \u{3000}]+").expect("hardcoded regex is valid"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("hardcoded regex is valid"));

/// Parses a selector that is known to be valid
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("hardcoded selector is valid")
}

/// Returns an element's text with whitespace runs collapsed to single spaces
pub fn collapsed_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the collapsed text of the first match of `selector` that has any
pub fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .map(collapsed_text)
        .find(|text| !text.is_empty())
}

/// Returns the first non-empty value of `attr` on `scope` or its descendants
pub fn first_attr(scope: ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    std::iter::once(scope)
        .chain(scope.select(selector))
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Reads labelled pairs from definition lists (`<dt>コスト</dt><dd>2</dd>`)
///
/// Lists whose term and definition counts differ are skipped; their pairing
/// cannot be trusted. A definition rendered only as icons contributes the
/// icons' alt texts. Ability definitions keep their line structure.
pub fn labelled_fields(scope: ElementRef) -> Vec<(CardField, String)> {
    let mut fields = Vec::new();

    for list in scope.select(&DEFINITION_LIST) {
        let terms: Vec<ElementRef> = list.select(&TERM).collect();
        let definitions: Vec<ElementRef> = list.select(&DEFINITION).collect();
        if terms.is_empty() || terms.len() != definitions.len() {
            continue;
        }

        for (term, definition) in terms.into_iter().zip(definitions) {
            let Some(field) = CardField::from_label(&collapsed_text(term)) else {
                continue;
            };

            let value = if field == CardField::Ability {
                ability_text(definition)
            } else {
                definition_value(definition)
            };

            if let Some(value) = value {
                fields.push((field, value));
            }
        }
    }

    fields
}

fn definition_value(definition: ElementRef) -> Option<String> {
    let text = collapsed_text(definition);
    if !text.is_empty() {
        return Some(text);
    }

    let alts: Vec<&str> = definition
        .select(&IMAGE)
        .filter_map(|img| img.value().attr("alt"))
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .collect();

    if alts.is_empty() {
        None
    } else {
        Some(alts.join(" "))
    }
}

/// Reads cost, power and hit points from the status block
pub fn status_numbers(scope: ElementRef) -> Vec<(CardField, String)> {
    [
        (CardField::Cost, &*STATUS_COST),
        (CardField::Power, &*STATUS_POWER),
        (CardField::Hp, &*STATUS_HP),
    ]
    .into_iter()
    .filter_map(|(field, status)| {
        let text = first_text(scope, status)?;
        let number = FIRST_NUMBER.find(&text)?;
        Some((field, number.as_str().to_string()))
    })
    .collect()
}

/// Reads `data-*` attributes that name a card field (`data-cost="2"`)
pub fn data_attributes(element: ElementRef) -> Vec<(CardField, String)> {
    element
        .value()
        .attrs()
        .filter_map(|(name, value)| {
            let field = CardField::from_data_attribute(name.strip_prefix("data-")?)?;
            Some((field, value.to_string()))
        })
        .collect()
}

/// Renders ability text with its line structure
///
/// - `<br>` becomes a line break; source newlines are ordinary whitespace
/// - Icon images become their alt text
/// - Runs of horizontal whitespace collapse to one space
/// - Each line is trimmed; empty leading and trailing lines are dropped
///
/// Returns None when nothing but whitespace remains.
pub fn ability_text(element: ElementRef) -> Option<String> {
    let mut raw = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                if !node.ancestors().any(|ancestor| is_script(ancestor.value())) {
                    raw.push_str(&text.replace('\n', " "));
                }
            }
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            Node::Element(el) if el.name() == "img" => {
                if let Some(alt) = el.attr("alt") {
                    raw.push_str(alt.trim());
                }
            }
            _ => {}
        }
    }

    let collapsed = HORIZONTAL_SPACE.replace_all(&raw, " ");
    let lines: Vec<&str> = collapsed.split('\n').map(str::trim).collect();

    let start = lines.iter().position(|line| !line.is_empty())?;
    let end = lines.iter().rposition(|line| !line.is_empty())?;

    Some(lines[start..=end].join("\n"))
}

fn is_script(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.name() == "script" || el.name() == "style")
}
