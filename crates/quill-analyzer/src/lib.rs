//! Quill Analyzer - Story element extraction
//!
//! Scans chapter prose with a fixed set of regular expressions and
//! proposes characters, places, events and items for a writer to review.
//! Analysis is a pure function of the input text: it never fails, it only
//! finds nothing.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub mod analyzer;
pub mod characters;
pub mod events;
pub mod import;
pub mod items;
pub mod places;
pub mod text;

pub use analyzer::TextAnalyzer;
pub use import::{ElementImporter, ImportReport, ImportSelection, Selection};

/// Character seen speaking or acting in the text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCharacter {
    pub name: String,
    pub dialogues: Vec<String>,
    pub actions: Vec<String>,
}

/// Place named in the text, with the context of its first mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPlace {
    pub name: String,
    pub context: String,
}

/// Sentence ranked as narratively significant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEvent {
    pub text: String,
    pub importance: u32,
}

/// Object mentioned in the text, lowercased
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub name: String,
    pub context: String,
}

/// Everything found in one pass over a chapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub characters: Vec<ExtractedCharacter>,
    pub places: Vec<ExtractedPlace>,
    pub events: Vec<ExtractedEvent>,
    pub items: Vec<ExtractedItem>,
}

impl AnalysisResult {
    /// True when no category found anything
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.places.is_empty()
            && self.events.is_empty()
            && self.items.is_empty()
    }

    /// Total number of extracted elements
    pub fn total(&self) -> usize {
        self.characters.len() + self.places.len() + self.events.len() + self.items.len()
    }
}

/// One extraction pass over a text for a single category
pub trait ElementExtractor: Send + Sync {
    type Element;

    fn extract(&self, text: &str) -> Vec<Self::Element>;
}

static DEFAULT_ANALYZER: Lazy<TextAnalyzer> = Lazy::new(TextAnalyzer::new);

/// Analyze text with the default settings
pub fn analyze(text: &str) -> AnalysisResult {
    DEFAULT_ANALYZER.analyze(text)
}

/// Analyze possibly missing text; `None` yields an empty result
pub fn analyze_opt(text: Option<&str>) -> AnalysisResult {
    text.map(analyze).unwrap_or_default()
}
