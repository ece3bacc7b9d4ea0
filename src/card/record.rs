use crate::card::CardField;

/// One card's metadata, keyed by card number
///
/// Every attribute except the card number is optional: list pages rarely carry
/// all of them, and non-unit cards have no power or hit points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardRecord {
    /// Card number (e.g. `BP01-001`), unique within one output set
    pub cardno: String,
    pub name: Option<String>,
    pub class: Option<String>,
    pub cost: Option<String>,
    pub power: Option<String>,
    /// Hit points; None for spells, amulets and other non-unit cards
    pub hp: Option<String>,
    pub kind: Option<String>,
    pub rarity: Option<String>,
    /// Expansion code (e.g. `BP16`)
    pub expansion: Option<String>,
    /// Ability and keyword text; may span several lines
    pub ability: Option<String>,
    /// Absolute URL of the card's detail page
    pub url: Option<String>,
}

impl CardRecord {
    /// Creates a record carrying only its card number
    pub fn new(cardno: impl Into<String>) -> Self {
        Self {
            cardno: cardno.into(),
            ..Self::default()
        }
    }

    /// Returns the value of an optional field
    pub fn get(&self, field: CardField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Sets a field only if it is still empty
    ///
    /// Values are normalized first (see `normalize_value`); a value that
    /// normalizes to nothing leaves the field untouched. Ability text is the
    /// exception to first-wins: distinct ability/keyword blocks are joined
    /// line by line.
    ///
    /// # Returns
    ///
    /// `true` if the record changed
    pub fn set_if_empty(&mut self, field: CardField, value: &str) -> bool {
        let Some(value) = normalize_value(field, value) else {
            return false;
        };

        let slot = self.slot_mut(field);
        if let Some(existing) = slot.as_mut() {
            if field == CardField::Ability && !existing.contains(&value) {
                existing.push('\n');
                existing.push_str(&value);
                return true;
            }
            return false;
        }

        *slot = Some(value);
        true
    }

    /// Fills every empty field from another record of the same card
    ///
    /// The card number never changes. Returns the number of fields filled.
    pub fn fill_missing_from(&mut self, other: &CardRecord) -> usize {
        let mut filled = 0;

        for field in CardField::all_fields() {
            if self.get(field).is_none() {
                if let Some(value) = other.get(field) {
                    if self.set_if_empty(field, value) {
                        filled += 1;
                    }
                }
            }
        }

        if self.url.is_none() && other.url.is_some() {
            self.url = other.url.clone();
            filled += 1;
        }

        filled
    }

    /// Returns the fields that are still unknown
    pub fn missing_fields(&self) -> Vec<CardField> {
        CardField::all_fields()
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    fn slot(&self, field: CardField) -> &Option<String> {
        match field {
            CardField::Name => &self.name,
            CardField::Class => &self.class,
            CardField::Cost => &self.cost,
            CardField::Power => &self.power,
            CardField::Hp => &self.hp,
            CardField::Kind => &self.kind,
            CardField::Rarity => &self.rarity,
            CardField::Expansion => &self.expansion,
            CardField::Ability => &self.ability,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: CardField) -> &mut Option<String> {
        match field {
            CardField::Name => &mut self.name,
            CardField::Class => &mut self.class,
            CardField::Cost => &mut self.cost,
            CardField::Power => &mut self.power,
            CardField::Hp => &mut self.hp,
            CardField::Kind => &mut self.kind,
            CardField::Rarity => &mut self.rarity,
            CardField::Expansion => &mut self.expansion,
            CardField::Ability => &mut self.ability,
        }
    }
}

/// Best-effort record assembly from individually extracted fields
///
/// Each extractor contributes an `Option`; missing values are simply skipped.
/// Only the card number is mandatory, and `build` returns None without one.
#[derive(Debug, Default)]
pub struct CardRecordBuilder {
    cardno: Option<String>,
    record: CardRecord,
}

impl CardRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a card number; the first non-empty one wins
    pub fn cardno(&mut self, cardno: Option<String>) -> &mut Self {
        if self.cardno.is_none() {
            self.cardno = cardno
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
        }
        self
    }

    /// Offers a field value; the first non-empty one wins
    pub fn field(&mut self, field: CardField, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.record.set_if_empty(field, &value);
        }
        self
    }

    /// Offers the detail-page URL; the first one wins
    pub fn url(&mut self, url: Option<String>) -> &mut Self {
        if self.record.url.is_none() {
            self.record.url = url;
        }
        self
    }

    /// Returns true if a card number has been found
    pub fn has_cardno(&self) -> bool {
        self.cardno.is_some()
    }

    /// Finishes the record
    ///
    /// The expansion code falls back to the card number's prefix when no
    /// labelled value was found.
    pub fn build(self) -> Option<CardRecord> {
        let cardno = self.cardno?;
        let mut record = self.record;

        if record.expansion.is_none() {
            record.expansion = expansion_from_cardno(&cardno);
        }
        record.cardno = cardno;

        Some(record)
    }
}

/// Derives the expansion code from a card number
///
/// # Examples
///
/// ```
/// use sve_cardlist::card::expansion_from_cardno;
///
/// assert_eq!(expansion_from_cardno("BP16-001"), Some("BP16".to_string()));
/// assert_eq!(expansion_from_cardno("nodash"), None);
/// ```
pub fn expansion_from_cardno(cardno: &str) -> Option<String> {
    let (prefix, _) = cardno.split_once('-')?;
    let prefix = prefix.trim();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.to_string())
    }
}

/// Normalizes a raw field value
///
/// - Leading/trailing whitespace is removed; placeholder dashes count as empty
/// - Numeric fields keep only their first run of digits (full-width digits
///   are folded to ASCII)
fn normalize_value(field: CardField, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || matches!(value, "-" | "－" | "―" | "ー") {
        return None;
    }

    if field.is_numeric() {
        let digits: String = value
            .chars()
            .map(fold_fullwidth_digit)
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        return if digits.is_empty() { None } else { Some(digits) };
    }

    Some(value.to_string())
}

fn fold_fullwidth_digit(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        _ => c,
    }
}
