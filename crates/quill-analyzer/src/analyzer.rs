//! Chapter analyzer
//!
//! Runs the four extractors over the same text. They share nothing but the
//! input, so their order does not affect the result.

use quill_core::AnalyzerConfig;

use crate::characters::CharacterExtractor;
use crate::events::EventExtractor;
use crate::items::ItemExtractor;
use crate::places::PlaceExtractor;
use crate::{AnalysisResult, ElementExtractor};

/// Heuristic extractor for characters, places, events and items
pub struct TextAnalyzer {
    characters: CharacterExtractor,
    places: PlaceExtractor,
    events: EventExtractor,
    items: ItemExtractor,
}

impl TextAnalyzer {
    /// Create an analyzer with the default constants
    pub fn new() -> Self {
        Self::with_config(&AnalyzerConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: &AnalyzerConfig) -> Self {
        Self {
            characters: CharacterExtractor::new(),
            places: PlaceExtractor::new(config.place_context_radius, config.min_name_len),
            events: EventExtractor::new(config.max_events),
            items: ItemExtractor::new(config.item_context_radius, config.min_name_len),
        }
    }

    /// Extract every category from `text`
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        if text.is_empty() {
            return AnalysisResult::default();
        }

        let result = AnalysisResult {
            characters: self.characters.extract(text),
            places: self.places.extract(text),
            events: self.events.extract(text),
            items: self.items.extract(text),
        };

        tracing::debug!(
            chars = text.len(),
            characters = result.characters.len(),
            places = result.places.len(),
            events = result.events.len(),
            items = result.items.len(),
            "analyzed text"
        );

        result
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
