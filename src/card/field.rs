/// Card field definitions and on-page label mapping
///
/// The site renders card attributes as labelled pairs (`<dt>コスト</dt><dd>2</dd>`).
/// This module maps those labels onto the record's optional fields.
use std::fmt;

/// An optional attribute of a card record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Name,
    Class,
    Cost,
    Power,
    Hp,
    Kind,
    Rarity,
    Expansion,
    Ability,
}

/// Label → field mapping (Japanese labels as rendered by the site, English for
/// the localized layout). Labels are compared after punctuation/space removal.
const LABELS: &[(&str, CardField)] = &[
    ("カード名", CardField::Name),
    ("名称", CardField::Name),
    ("name", CardField::Name),
    ("クラス", CardField::Class),
    ("class", CardField::Class),
    ("コスト", CardField::Cost),
    ("cost", CardField::Cost),
    ("パワー", CardField::Power),
    ("攻撃力", CardField::Power),
    ("power", CardField::Power),
    ("attack", CardField::Power),
    ("体力", CardField::Hp),
    ("hp", CardField::Hp),
    ("defense", CardField::Hp),
    ("カード種類", CardField::Kind),
    ("種類", CardField::Kind),
    ("cardtype", CardField::Kind),
    ("type", CardField::Kind),
    ("レアリティ", CardField::Rarity),
    ("rarity", CardField::Rarity),
    ("収録商品", CardField::Expansion),
    ("商品", CardField::Expansion),
    ("expansion", CardField::Expansion),
    ("set", CardField::Expansion),
    ("能力", CardField::Ability),
    ("キーワード", CardField::Ability),
    ("ability", CardField::Ability),
    ("keywords", CardField::Ability),
    ("text", CardField::Ability),
];

impl CardField {
    /// Maps an on-page label to a field
    ///
    /// Whitespace and colons (ASCII and full-width) are ignored, and ASCII
    /// labels match case-insensitively. Unknown labels (illustrator, title,
    /// tribe, ...) return None and are skipped by the extractors.
    ///
    /// # Examples
    ///
    /// ```
    /// use sve_cardlist::card::CardField;
    ///
    /// assert_eq!(CardField::from_label("コスト："), Some(CardField::Cost));
    /// assert_eq!(CardField::from_label("Rarity:"), Some(CardField::Rarity));
    /// assert_eq!(CardField::from_label("イラストレーター"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let simplified: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':' && *c != '：')
            .collect::<String>()
            .to_lowercase();

        if simplified.is_empty() {
            return None;
        }

        LABELS
            .iter()
            .find(|(name, _)| *name == simplified)
            .map(|(_, field)| *field)
    }

    /// Maps a `data-*` attribute suffix (`data-cost`, `data-hp`, ...) to a field
    pub fn from_data_attribute(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "class" => Some(Self::Class),
            "cost" => Some(Self::Cost),
            "power" => Some(Self::Power),
            "hp" => Some(Self::Hp),
            "kind" | "card-kind" | "card_kind" => Some(Self::Kind),
            "rarity" => Some(Self::Rarity),
            "expansion" | "expansion-name" | "expansion_name" => Some(Self::Expansion),
            _ => None,
        }
    }

    /// Returns true for fields holding a single number (cost, power, hp)
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Cost | Self::Power | Self::Hp)
    }

    /// Returns all fields in output column order
    pub fn all_fields() -> [Self; 9] {
        [
            Self::Name,
            Self::Class,
            Self::Cost,
            Self::Power,
            Self::Hp,
            Self::Kind,
            Self::Rarity,
            Self::Expansion,
            Self::Ability,
        ]
    }

    /// Returns the column name used in the TSV header
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Class => "class",
            Self::Cost => "cost",
            Self::Power => "power",
            Self::Hp => "hp",
            Self::Kind => "kind",
            Self::Rarity => "rarity",
            Self::Expansion => "expansion",
            Self::Ability => "ability",
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
