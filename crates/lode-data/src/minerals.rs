//! Mineral universe and the static lookup tables tied to it.
//!
//! The set of forecastable minerals is closed. Production sheets name them by
//! label, price sheets by ticker code; both mappings live here as plain tables.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Prefix of production-volume panel columns.
pub const PRODUCTION_PREFIX: &str = "prod_";

/// Prefix of price panel columns.
pub const PRICE_PREFIX: &str = "price_";

/// Commodities tracked by the pipeline.
///
/// Serialized as the slug, matching the panel column suffixes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mineral {
    /// Gold
    #[display("Gold")]
    Gold,

    /// Coal
    #[display("Coal")]
    Coal,

    /// Iron ore
    #[display("Iron ore")]
    IronOre,

    /// Copper
    #[display("Copper")]
    Copper,
}

/// Price ticker codes and the mineral each one quotes.
pub const TICKER_TABLE: &[(&str, Mineral)] = &[
    ("GOLD", Mineral::Gold),
    ("COAL_SAFRICA", Mineral::Coal),
    ("IRON_ORE", Mineral::IronOre),
    ("COPPER", Mineral::Copper),
];

impl Mineral {
    /// Returns all minerals.
    pub fn all() -> Vec<Self> {
        vec![Self::Gold, Self::Coal, Self::IronOre, Self::Copper]
    }

    /// Label used in production spreadsheets.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Coal => "Coal",
            Self::IronOre => "Iron ore",
            Self::Copper => "Copper",
        }
    }

    /// Lower-case column-safe name.
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Coal => "coal",
            Self::IronOre => "iron_ore",
            Self::Copper => "copper",
        }
    }

    /// Match a production label exactly (after trimming).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::all().into_iter().find(|m| m.label() == label)
    }

    /// Parse a user-supplied name: label or slug, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all().into_iter().find(|m| {
            m.label().eq_ignore_ascii_case(name) || m.slug().eq_ignore_ascii_case(name)
        })
    }

    /// Mineral quoted by a price ticker.
    pub fn from_ticker(ticker: &str) -> Option<Self> {
        let ticker = ticker.trim();
        TICKER_TABLE
            .iter()
            .find(|(code, _)| *code == ticker)
            .map(|(_, mineral)| *mineral)
    }

    /// Panel column holding this mineral's production volume.
    pub fn production_column(&self) -> String {
        format!("{PRODUCTION_PREFIX}{}", self.slug())
    }

    /// Panel column holding this mineral's price.
    pub fn price_column(&self) -> String {
        format!("{PRICE_PREFIX}{}", self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_minerals() {
        assert_eq!(Mineral::all().len(), 4);
    }

    #[rstest]
    #[case("Gold", Some(Mineral::Gold))]
    #[case(" Iron ore ", Some(Mineral::IronOre))]
    #[case("iron ore", None)]
    #[case("Platinum", None)]
    fn test_from_label(#[case] label: &str, #[case] expected: Option<Mineral>) {
        assert_eq!(Mineral::from_label(label), expected);
    }

    #[test]
    fn test_from_name_accepts_slug_and_label() {
        assert_eq!(Mineral::from_name("iron_ore"), Some(Mineral::IronOre));
        assert_eq!(Mineral::from_name("COPPER"), Some(Mineral::Copper));
        assert_eq!(Mineral::from_name("Iron ore"), Some(Mineral::IronOre));
        assert_eq!(Mineral::from_name("zinc"), None);
    }

    #[test]
    fn test_ticker_table() {
        assert_eq!(Mineral::from_ticker("COAL_SAFRICA"), Some(Mineral::Coal));
        assert_eq!(Mineral::from_ticker("COAL_AUS"), None);
        for mineral in Mineral::all() {
            assert!(TICKER_TABLE.iter().any(|(_, m)| *m == mineral));
        }
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Mineral::IronOre.production_column(), "prod_iron_ore");
        assert_eq!(Mineral::Gold.price_column(), "price_gold");
        assert_eq!(Mineral::IronOre.to_string(), "Iron ore");
    }
}
