//! Place extraction

use std::collections::HashSet;

use regex::Regex;

use crate::text::{char_len, context_window};
use crate::{ElementExtractor, ExtractedPlace};

/// Capitalized place name of one to three words
const PLACE_NAME: &str = r"[A-Z][a-z]+(?: [A-Z][a-z]+){0,2}";

/// Extracts named places from prepositional phrases, arrival and
/// departure verbs, and descriptive "The X stood" sentences.
///
/// Patterns run in order over the whole text; the first match of a name
/// wins and its context is kept.
pub struct PlaceExtractor {
    /// Place name is capture group 1
    patterns: Vec<Regex>,
    context_radius: usize,
    min_name_len: usize,
}

impl PlaceExtractor {
    pub fn new(context_radius: usize, min_name_len: usize) -> Self {
        let mut extractor = Self {
            patterns: Vec::new(),
            context_radius,
            min_name_len,
        };

        extractor.add_pattern(&format!(
            r"\b(?i:in|at|to|from|near|inside|outside|towards?|through|across|into|beyond)\s+the\s+({PLACE_NAME})"
        ));
        extractor.add_pattern(&format!(
            r"\b(?:arrived at|reached|entered|left|departed from|returned to|traveled to|travelled to|journeyed to|fled to)\s+(?:the\s+)?({PLACE_NAME})"
        ));
        extractor.add_pattern(&format!(
            r"\bThe\s+({PLACE_NAME})\s+(?:was|stood|lay|loomed|rose|stretched|towered)\b"
        ));

        extractor
    }

    fn add_pattern(&mut self, pattern: &str) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push(regex);
        }
    }
}

impl Default for PlaceExtractor {
    fn default() -> Self {
        Self::new(50, 4)
    }
}

impl ElementExtractor for PlaceExtractor {
    type Element = ExtractedPlace;

    fn extract(&self, text: &str) -> Vec<ExtractedPlace> {
        let mut places = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for regex in &self.patterns {
            for caps in regex.captures_iter(text) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let name = name.as_str();
                if char_len(name) < self.min_name_len || !seen.insert(name) {
                    continue;
                }

                places.push(ExtractedPlace {
                    name: name.to_string(),
                    context: context_window(text, whole.start(), self.context_radius).to_string(),
                });
            }
        }

        places
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<ExtractedPlace> {
        PlaceExtractor::default().extract(text)
    }

    fn names(places: &[ExtractedPlace]) -> Vec<&str> {
        places.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_prepositional_place() {
        let places = extract("They rested in the Golden Valley before dawn.");

        assert_eq!(names(&places), vec!["Golden Valley"]);
        assert_eq!(
            places[0].context,
            "They rested in the Golden Valley before dawn."
        );
    }

    #[test]
    fn test_arrival_and_landmark_patterns() {
        let text = "At last they arrived at Rivendell. The Lonely Tower stood on the hill.";
        let places = extract(text);

        assert_eq!(names(&places), vec!["Rivendell", "Lonely Tower"]);
    }

    #[test]
    fn test_first_pattern_wins_for_duplicates() {
        // "Shire" is found by the prepositional pattern before the arrival pattern
        let text = "Frodo left the Shire at dawn. Years later he returned to the Shire.";
        let places = extract(text);

        assert_eq!(names(&places), vec!["Shire"]);
        assert!(places[0].context.contains("returned to the Shire"));
    }

    #[test]
    fn test_short_names_dropped() {
        let places = extract("They sailed to the Isle of Man and on to Oz.");
        assert_eq!(names(&places), vec!["Isle"]);

        assert!(extract("He went to the Inn.").is_empty());
    }

    #[test]
    fn test_context_window_is_bounded() {
        let filler = "x".repeat(200);
        let text = format!("{filler} they camped near the Black Gate {filler}");
        let places = extract(&text);

        assert_eq!(names(&places), vec!["Black Gate"]);
        let context = &places[0].context;
        assert_eq!(context.chars().count(), 100);
        assert!(context.starts_with("xxx"));
        assert!(context.contains("near the Black Gate"));
    }

    #[test]
    fn test_lowercase_destination_ignored() {
        assert!(extract("She walked to the door and into the kitchen.").is_empty());
    }
}
