//! Item extraction

use std::collections::HashSet;

use regex::Regex;

use crate::text::{char_len, context_window};
use crate::{ElementExtractor, ExtractedItem};

/// Function words a greedy noun phrase can swallow at its end
const TRAILING_STOPWORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "in", "into", "of", "on", "or",
    "the", "then", "to", "with",
];

/// Item pattern with the item name in capture group 1
struct ItemPattern {
    regex: Regex,
    /// Words the name must keep after stopword trimming
    min_words: usize,
}

/// Extracts objects from possession verbs, sensory descriptions and
/// magical adjectives. Names are lowercased.
pub struct ItemExtractor {
    patterns: Vec<ItemPattern>,
    context_radius: usize,
    min_name_len: usize,
}

impl ItemExtractor {
    pub fn new(context_radius: usize, min_name_len: usize) -> Self {
        let mut extractor = Self {
            patterns: Vec::new(),
            context_radius,
            min_name_len,
        };

        // held the silver key
        extractor.add_pattern(
            r"\b(?:held|carried|wielded|grabbed|picked up|drew|took|wore|clutched|raised|lifted|pocketed)\s+(?:a|an|the|his|her|their|its|my|your)\s+([a-z]+(?: [a-z]+)?)",
            1,
        );
        // the amulet glowed
        extractor.add_pattern(
            r"\b(?:[Tt]he|[Aa]n?|[Hh]is|[Hh]er|[Tt]heir|[Ii]ts)\s+((?:[a-z]+ )?[a-z]+)\s+(?:glowed|gleamed|shimmered|sparkled|glittered|hummed|pulsed|shone|burned|flickered)\b",
            1,
        );
        // enchanted ring
        extractor.add_pattern(
            r"(?i)\b((?:magic|magical|enchanted|cursed|ancient|legendary|sacred|mystic|mystical|blessed|glowing) [a-z]+)",
            2,
        );

        extractor
    }

    fn add_pattern(&mut self, pattern: &str, min_words: usize) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push(ItemPattern { regex, min_words });
        }
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new(30, 4)
    }
}

/// Lowercase a matched phrase and drop trailing function words
fn normalize_name(raw: &str) -> Vec<String> {
    let mut words: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
    while words
        .last()
        .is_some_and(|w| TRAILING_STOPWORDS.contains(&w.as_str()))
    {
        words.pop();
    }
    words
}

impl ElementExtractor for ItemExtractor {
    type Element = ExtractedItem;

    fn extract(&self, text: &str) -> Vec<ExtractedItem> {
        let mut items = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                let (Some(whole), Some(raw)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };

                let words = normalize_name(raw.as_str());
                if words.len() < pattern.min_words {
                    continue;
                }
                let name = words.join(" ");
                if char_len(&name) < self.min_name_len || seen.contains(&name) {
                    continue;
                }

                seen.insert(name.clone());
                items.push(ExtractedItem {
                    name,
                    context: context_window(text, whole.start(), self.context_radius).to_string(),
                });
            }
        }

        items
    }
}
