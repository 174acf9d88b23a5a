use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEMO_DECK: &str = include_str!("../decks/demo.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    #[serde(default)]
    pub slides: Vec<SlideSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideSpec {
    /// Play the opening splash sequence instead of the plain entrance.
    #[serde(default)]
    pub splash: bool,

    /// Icon name shown large above the title on splash slides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeBlock>,

    /// Call-to-action button label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub code: String,
}

/// A piece of slide content that enters with its own staggered animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Title,
    Subtitle,
    Badge(usize),
    Card(usize),
    Code,
    Cta,
}

impl ElementKind {
    /// Cards and code windows tilt with the pointer.
    pub fn tilts(self) -> bool {
        matches!(self, ElementKind::Card(_) | ElementKind::Code)
    }
}

impl SlideSpec {
    /// Content elements in display (and stagger) order.
    pub fn elements(&self) -> Vec<ElementKind> {
        let mut out = Vec::new();
        if self.title.is_some() {
            out.push(ElementKind::Title);
        }
        if self.subtitle.is_some() {
            out.push(ElementKind::Subtitle);
        }
        out.extend((0..self.badges.len()).map(ElementKind::Badge));
        out.extend((0..self.cards.len()).map(ElementKind::Card));
        if self.code.is_some() {
            out.push(ElementKind::Code);
        }
        if self.cta.is_some() {
            out.push(ElementKind::Cta);
        }
        out
    }
}

impl Deck {
    pub fn parse(content: &str) -> Result<Self> {
        let deck: Deck = serde_yaml::from_str(content).context("Invalid deck file")?;
        if deck.slides.is_empty() {
            anyhow::bail!("No slides found in deck");
        }
        Ok(deck)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let deck = Self::parse(&content).with_context(|| format!("In {}", path.display()))?;
        debug!(path = %path.display(), slides = deck.slides.len(), "deck loaded");
        Ok(deck)
    }

    /// The deck bundled with the binary.
    pub fn demo() -> Result<Self> {
        Self::parse(DEMO_DECK)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_deck_parses() {
        let deck = Deck::demo().unwrap();
        assert!(deck.slide_count() >= 3);
        assert!(deck.slides[0].splash);
        assert!(deck.slides.iter().any(|s| s.code.is_some()));
    }

    #[test]
    fn test_empty_deck_rejected() {
        let err = Deck::parse("title: Nothing\nslides: []\n").unwrap_err();
        assert!(err.to_string().contains("No slides"));
    }

    #[test]
    fn test_malformed_deck_rejected() {
        assert!(Deck::parse("slides: 12").is_err());
    }

    #[test]
    fn test_element_order() {
        let yaml = r#"
slides:
  - title: Hello
    cta: Go
    badges: [a, b]
    cards:
      - title: One
    code:
      code: "fn main() {}"
    subtitle: World
"#;
        let deck = Deck::parse(yaml).unwrap();
        assert_eq!(
            deck.slides[0].elements(),
            vec![
                ElementKind::Title,
                ElementKind::Subtitle,
                ElementKind::Badge(0),
                ElementKind::Badge(1),
                ElementKind::Card(0),
                ElementKind::Code,
                ElementKind::Cta,
            ]
        );
    }

    #[test]
    fn test_only_cards_and_code_tilt() {
        assert!(ElementKind::Card(2).tilts());
        assert!(ElementKind::Code.tilts());
        assert!(!ElementKind::Title.tilts());
        assert!(!ElementKind::Badge(0).tilts());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = Deck::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
