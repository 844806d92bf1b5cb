//! Character extraction
//!
//! Two passes: quoted speech attributed with a speech verb, then a
//! capitalized name followed by a physical verb. A name is reported when
//! it speaks at least once or acts more than once.

use std::collections::HashMap;

use regex::Regex;

use crate::{ElementExtractor, ExtractedCharacter};

/// Capitalized name of one to three words
const NAME: &str = r"[A-Z][a-z]+(?: [A-Z][a-z]+){0,2}";

const SPEECH_VERBS: &str = "said|asked|replied|shouted|whispered|exclaimed|answered|muttered|called|cried|yelled|responded";

const ACTION_VERBS: &str =
    "walked|ran|jumped|looked|turned|stood|sat|moved|reached|grabbed|took|opened|closed|smiled|nodded";

/// Extracts characters from dialogue attribution and action phrases
pub struct CharacterExtractor {
    /// Quoted text (group 1) attributed to a name (group 2)
    dialogue_patterns: Vec<Regex>,
    /// Name (group 1) followed by an action verb
    action_patterns: Vec<Regex>,
}

impl CharacterExtractor {
    pub fn new() -> Self {
        let mut extractor = Self {
            dialogue_patterns: Vec::new(),
            action_patterns: Vec::new(),
        };

        add_pattern(
            &mut extractor.dialogue_patterns,
            &format!(r#"["“]([^"“”]+)["”]\s*(?:{SPEECH_VERBS})\s+({NAME})"#),
        );
        add_pattern(
            &mut extractor.action_patterns,
            &format!(r"\b({NAME}) (?:{ACTION_VERBS})\b"),
        );

        extractor
    }
}

fn add_pattern(patterns: &mut Vec<Regex>, pattern: &str) {
    if let Ok(regex) = Regex::new(pattern) {
        patterns.push(regex);
    }
}

impl Default for CharacterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Characters in first-sighting order
#[derive(Default)]
struct Roster {
    characters: Vec<ExtractedCharacter>,
    index: HashMap<String, usize>,
}

impl Roster {
    fn entry(&mut self, name: &str) -> &mut ExtractedCharacter {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.characters.push(ExtractedCharacter {
                    name: name.to_string(),
                    dialogues: Vec::new(),
                    actions: Vec::new(),
                });
                let idx = self.characters.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.characters[idx]
    }
}

impl ElementExtractor for CharacterExtractor {
    type Element = ExtractedCharacter;

    fn extract(&self, text: &str) -> Vec<ExtractedCharacter> {
        let mut roster = Roster::default();

        for regex in &self.dialogue_patterns {
            for caps in regex.captures_iter(text) {
                if let (Some(quote), Some(name)) = (caps.get(1), caps.get(2)) {
                    roster
                        .entry(name.as_str())
                        .dialogues
                        .push(quote.as_str().to_string());
                }
            }
        }

        for regex in &self.action_patterns {
            for caps in regex.captures_iter(text) {
                if let (Some(phrase), Some(name)) = (caps.get(0), caps.get(1)) {
                    roster
                        .entry(name.as_str())
                        .actions
                        .push(phrase.as_str().to_string());
                }
            }
        }

        roster
            .characters
            .into_iter()
            .filter(|c| !c.dialogues.is_empty() || c.actions.len() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<ExtractedCharacter> {
        CharacterExtractor::new().extract(text)
    }

    #[test]
    fn test_dialogue_attribution() {
        let characters = extract(r#""Hello there," said Mary."#);

        assert_eq!(characters.len(), 1);
        assert_eq!(characters[0].name, "Mary");
        assert_eq!(characters[0].dialogues, vec!["Hello there,"]);
        assert!(characters[0].actions.is_empty());
    }

    #[test]
    fn test_repeated_actions_qualify() {
        let characters =
            extract("John walked to the door. John walked to the window. John walked away.");

        assert_eq!(characters.len(), 1);
        assert_eq!(characters[0].name, "John");
        assert_eq!(characters[0].actions.len(), 3);
        assert_eq!(characters[0].actions[0], "John walked");
        assert!(characters[0].dialogues.is_empty());
    }

    #[test]
    fn test_single_action_is_noise() {
        assert!(extract("Morning came. Peter opened the shutters.").is_empty());
    }

    #[test]
    fn test_multi_word_name_and_curly_quotes() {
        let text = "“Where is it?” asked Anna Maria Lopez. “Gone,” replied Tom.";
        let characters = extract(text);

        let names: Vec<&str> = characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Anna Maria Lopez", "Tom"]);
        assert_eq!(characters[0].dialogues, vec!["Where is it?"]);
        assert_eq!(characters[1].dialogues, vec!["Gone,"]);
    }

    #[test]
    fn test_dialogue_and_action_merge_in_first_sighting_order() {
        let text = concat!(
            "Sam ran ahead. Sam turned back. ",
            r#""Wait," said Frodo. Frodo nodded."#
        );
        let characters = extract(text);

        let names: Vec<&str> = characters.iter().map(|c| c.name.as_str()).collect();
        // Frodo is sighted first by the dialogue pass
        assert_eq!(names, vec!["Frodo", "Sam"]);
        assert_eq!(characters[0].actions, vec!["Frodo nodded"]);
        assert_eq!(characters[1].actions, vec!["Sam ran", "Sam turned"]);
    }

    #[test]
    fn test_no_text() {
        assert!(extract("").is_empty());
        assert!(extract("nothing capitalized happens here.").is_empty());
    }
}
