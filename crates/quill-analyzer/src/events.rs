//! Event extraction
//!
//! Splits text into sentences, keeps those that read like plot beats and
//! ranks them by an importance heuristic.

use regex::Regex;

use crate::{ElementExtractor, ExtractedEvent};

/// Words that mark a sentence as significant; each one found adds 2
pub const SIGNIFICANT_WORDS: [&str; 13] = [
    "died",
    "death",
    "born",
    "birth",
    "married",
    "betrayed",
    "revealed",
    "discovered",
    "destroyed",
    "created",
    "transformed",
    "cursed",
    "blessed",
];

/// Sentences need more than this many space-separated tokens
const MIN_TOKENS: usize = 5;

/// Event category patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    Temporal,
    Discovery,
    Conflict,
    Travel,
    LifeEvent,
}

/// Extracts and ranks event sentences
pub struct EventExtractor {
    sentence: Option<Regex>,
    capitalized: Option<Regex>,
    categories: Vec<(Regex, EventCategory)>,
    max_events: usize,
}

impl EventExtractor {
    pub fn new(max_events: usize) -> Self {
        let mut extractor = Self {
            // A run of non-terminators plus its terminators
            sentence: Regex::new(r"[^.!?]+[.!?]*").ok(),
            capitalized: Regex::new(r"\b[A-Z][a-z]+").ok(),
            categories: Vec::new(),
            max_events,
        };

        extractor.add_category(
            r"(?i)\b(?:suddenly|then|after|before|when|while|later|finally|meanwhile|soon|eventually)\b",
            EventCategory::Temporal,
        );
        extractor.add_category(
            r"(?i)\b(?:discovered|found|realized|realised|learned|revealed|uncovered|noticed)\b",
            EventCategory::Discovery,
        );
        extractor.add_category(
            r"(?i)\b(?:fought|attacked|battled|killed|defeated|betrayed|struck|argued|destroyed)\b",
            EventCategory::Conflict,
        );
        extractor.add_category(
            r"(?i)\b(?:arrived|departed|traveled|travelled|journeyed|left|returned|fled|escaped)\b",
            EventCategory::Travel,
        );
        extractor.add_category(
            r"(?i)\b(?:died|born|married|wed|crowned|exiled|buried|cursed|blessed|transformed)\b",
            EventCategory::LifeEvent,
        );

        extractor
    }

    fn add_category(&mut self, pattern: &str, category: EventCategory) {
        if let Ok(regex) = Regex::new(pattern) {
            self.categories.push((regex, category));
        }
    }

    /// Categories a sentence falls into
    pub fn categorize(&self, sentence: &str) -> Vec<EventCategory> {
        self.categories
            .iter()
            .filter(|(regex, _)| regex.is_match(sentence))
            .map(|(_, category)| *category)
            .collect()
    }

    fn has_capitalized_word(&self, sentence: &str) -> bool {
        self.capitalized
            .as_ref()
            .is_some_and(|regex| regex.is_match(sentence))
    }

    /// Importance heuristic for a sentence
    pub fn importance(&self, sentence: &str) -> u32 {
        let lower = sentence.to_lowercase();
        let mut score = SIGNIFICANT_WORDS
            .iter()
            .filter(|word| lower.contains(*word))
            .count() as u32
            * 2;

        if self.has_capitalized_word(sentence) {
            score += 1;
        }
        if sentence.contains('!') {
            score += 1;
        }
        score
    }

    fn is_candidate(&self, sentence: &str) -> bool {
        self.categories.iter().any(|(regex, _)| regex.is_match(sentence))
            && self.has_capitalized_word(sentence)
            && sentence.split(' ').count() > MIN_TOKENS
    }
}

impl Default for EventExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ElementExtractor for EventExtractor {
    type Element = ExtractedEvent;

    fn extract(&self, text: &str) -> Vec<ExtractedEvent> {
        let Some(sentence_re) = &self.sentence else {
            return Vec::new();
        };

        let mut events: Vec<ExtractedEvent> = sentence_re
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty() && self.is_candidate(s))
            .map(|s| ExtractedEvent {
                text: s.to_string(),
                importance: self.importance(s),
            })
            .collect();

        // Stable: equal scores keep encounter order
        events.sort_by(|a, b| b.importance.cmp(&a.importance));
        events.truncate(self.max_events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<ExtractedEvent> {
        EventExtractor::default().extract(text)
    }

    #[test]
    fn test_importance_components() {
        let extractor = EventExtractor::default();

        assert_eq!(extractor.importance("the king died!"), 3);
        assert_eq!(extractor.importance("The king died"), 3);
        assert_eq!(extractor.importance("The king died!"), 4);
        // "died" and "death" both count
        assert_eq!(extractor.importance("the death of the man who died"), 4);
        assert_eq!(extractor.importance("nothing here"), 0);
    }

    #[test]
    fn test_importance_is_substring_match() {
        let extractor = EventExtractor::default();
        // "reborn" contains "born"
        assert_eq!(extractor.importance("reborn"), 2);
        // Case-insensitive vocabulary; all caps is not a capitalized word
        assert_eq!(extractor.importance("DISCOVERED"), 2);
    }

    #[test]
    fn test_candidate_rules() {
        let extractor = EventExtractor::default();

        assert!(extractor.is_candidate("Suddenly the old door opened wide"));
        // Too few tokens
        assert!(!extractor.is_candidate("Suddenly Anna left"));
        // No category word
        assert!(!extractor.is_candidate("Anna liked the quiet green hills very much"));
        // No capitalized word
        assert!(!extractor.is_candidate("then the old door opened very wide"));
    }

    #[test]
    fn test_sentence_keeps_terminator() {
        let events = extract("Then the Dragon attacked the village at night! The end.");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Then the Dragon attacked the village at night!");
        assert_eq!(events[0].importance, 2);
    }

    #[test]
    fn test_significant_sentence_scores_at_least_four() {
        let events = extract("Later that night the Queen was betrayed by her own guard!");

        assert_eq!(events.len(), 1);
        assert!(events[0].importance >= 4);
    }

    #[test]
    fn test_top_ten_by_score_with_stable_ties() {
        let mut text = String::new();
        for i in 0..12 {
            text.push_str(&format!("Then Arthur rode north for day number {i}. "));
        }
        text.push_str("Finally Arthur discovered the grave where Merlin died. ");
        text.push_str("Soon Arthur married the lady of the lake! ");

        let events = extract(&text);

        assert_eq!(events.len(), 10);
        assert_eq!(events[0].text, "Finally Arthur discovered the grave where Merlin died.");
        assert_eq!(events[0].importance, 5);
        assert_eq!(events[1].text, "Soon Arthur married the lady of the lake!");
        assert_eq!(events[1].importance, 4);
        for (offset, event) in events[2..].iter().enumerate() {
            assert_eq!(event.importance, 1);
            assert_eq!(event.text, format!("Then Arthur rode north for day number {offset}."));
        }
        assert!(events.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_categorize() {
        let extractor = EventExtractor::default();
        let categories = extractor.categorize("When they fled, Maria found the map");

        assert_eq!(
            categories,
            vec![
                EventCategory::Temporal,
                EventCategory::Discovery,
                EventCategory::Travel
            ]
        );
    }
}
