//! View modes and the fixed zone vocabularies of the detail and card views.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three presentations a field is arranged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Multi-step data-entry form; zones are steps.
    Form,
    /// Listing detail page; zones are sections.
    Detail,
    /// Result card; zones are card regions plus `hidden`.
    Card,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Form, ViewMode::Detail, ViewMode::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Form => "form",
            ViewMode::Detail => "detail",
            ViewMode::Card => "card",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section of the listing detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailSection {
    Header,
    Main,
    Sidebar,
}

impl Default for DetailSection {
    fn default() -> Self {
        DetailSection::Main
    }
}

impl DetailSection {
    pub const ALL: [DetailSection; 3] = [
        DetailSection::Header,
        DetailSection::Main,
        DetailSection::Sidebar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailSection::Header => "header",
            DetailSection::Main => "main",
            DetailSection::Sidebar => "sidebar",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.as_str() == s)
    }
}

impl fmt::Display for DetailSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual region of a result card.
///
/// `hidden` is not a card zone; it is the absence of card visibility and is
/// modelled by [`crate::ZoneId::Hidden`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardZone {
    HeaderTopLeft,
    HeaderTopRight,
    Cover,
    ImageOverlay,
    Body,
    Footer,
}

impl Default for CardZone {
    fn default() -> Self {
        CardZone::Body
    }
}

impl CardZone {
    pub const ALL: [CardZone; 6] = [
        CardZone::HeaderTopLeft,
        CardZone::HeaderTopRight,
        CardZone::Cover,
        CardZone::ImageOverlay,
        CardZone::Body,
        CardZone::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardZone::HeaderTopLeft => "header_top_left",
            CardZone::HeaderTopRight => "header_top_right",
            CardZone::Cover => "cover",
            CardZone::ImageOverlay => "image_overlay",
            CardZone::Body => "body",
            CardZone::Footer => "footer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|zone| zone.as_str() == s)
    }
}

impl fmt::Display for CardZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_zone_parse_matches_serde() {
        for zone in CardZone::ALL {
            let json = serde_json::to_string(&zone).unwrap();
            assert_eq!(json, format!("\"{}\"", zone.as_str()));
            assert_eq!(CardZone::parse(zone.as_str()), Some(zone));
        }
        assert_eq!(CardZone::parse("hidden"), None);
    }

    #[test]
    fn test_detail_section_parse() {
        assert_eq!(DetailSection::parse("sidebar"), Some(DetailSection::Sidebar));
        assert_eq!(DetailSection::parse("footer"), None);
    }
}
