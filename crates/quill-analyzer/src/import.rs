//! Element importer
//!
//! Persists the extracted elements a writer chose to keep into a
//! `StoryStore`. Stores are idempotent on `(novel, kind, name)`, so
//! importing the same analysis twice creates nothing new.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::{ElementKind, StoryStore, UpsertOutcome};

use crate::text::truncate_chars;
use crate::{AnalysisResult, ExtractedCharacter, ExtractedEvent};

/// Longest stored event name, in characters
const EVENT_NAME_LEN: usize = 80;

/// Hex digits of the digest appended to cut event names
const EVENT_DIGEST_LEN: usize = 8;

// ============================================================================
// Selection
// ============================================================================

/// Which elements of one category to keep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    None,
    /// Only elements with these names
    Only(Vec<String>),
}

impl Selection {
    fn keeps(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Only(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Per-category selection for an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSelection {
    pub characters: Selection,
    pub places: Selection,
    pub events: Selection,
    pub items: Selection,
}

impl ImportSelection {
    /// Keep everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Keep only the listed categories
    pub fn only_kinds(kinds: &[ElementKind]) -> Self {
        let pick = |kind| {
            if kinds.contains(&kind) {
                Selection::All
            } else {
                Selection::None
            }
        };
        Self {
            characters: pick(ElementKind::Character),
            places: pick(ElementKind::Place),
            events: pick(ElementKind::Event),
            items: pick(ElementKind::Item),
        }
    }

    fn for_kind(&self, kind: ElementKind) -> &Selection {
        match kind {
            ElementKind::Character => &self.characters,
            ElementKind::Place => &self.places,
            ElementKind::Event => &self.events,
            ElementKind::Item => &self.items,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// One element written (or not) by an import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedElement {
    pub kind: ElementKind,
    pub name: String,
    pub outcome: UpsertOutcome,
}

/// Element the store refused
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFailure {
    pub kind: ElementKind,
    pub name: String,
    pub error: String,
}

/// Result of importing an analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub novel_id: Uuid,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub elements: Vec<ImportedElement>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    fn new(novel_id: Uuid) -> Self {
        Self {
            novel_id,
            ..Self::default()
        }
    }

    fn record(&mut self, kind: ElementKind, name: String, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created(_) => self.created += 1,
            UpsertOutcome::Updated(_) => self.updated += 1,
            UpsertOutcome::Unchanged(_) => self.unchanged += 1,
        }
        self.elements.push(ImportedElement {
            kind,
            name,
            outcome,
        });
    }

    /// Number of elements the store accepted
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    /// True when nothing was written and nothing failed
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.failures.is_empty()
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Description stored for a character
pub fn character_description(character: &ExtractedCharacter) -> String {
    if let Some(line) = character.dialogues.first() {
        format!("Says: \"{line}\"")
    } else {
        character.actions.first().cloned().unwrap_or_default()
    }
}

/// Name stored for an event sentence
///
/// Sentences longer than the name limit are cut and tagged with a digest
/// of the full text, so two sentences sharing a prefix stay distinct.
pub fn event_name(event: &ExtractedEvent) -> String {
    if truncate_chars(&event.text, EVENT_NAME_LEN).len() == event.text.len() {
        return event.text.trim_end().to_string();
    }

    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, event.text.as_bytes())
        .simple()
        .to_string();
    let tag = &digest[..EVENT_DIGEST_LEN];
    let prefix = truncate_chars(&event.text, EVENT_NAME_LEN - EVENT_DIGEST_LEN - 3).trim_end();
    format!("{prefix} [{tag}]")
}

/// Flatten an analysis into `(kind, name, description)` rows
fn rows(analysis: &AnalysisResult) -> Vec<(ElementKind, String, String)> {
    let characters = analysis
        .characters
        .iter()
        .map(|c| (ElementKind::Character, c.name.clone(), character_description(c)));
    let places = analysis
        .places
        .iter()
        .map(|p| (ElementKind::Place, p.name.clone(), p.context.clone()));
    let events = analysis
        .events
        .iter()
        .map(|e| (ElementKind::Event, event_name(e), e.text.clone()));
    let items = analysis
        .items
        .iter()
        .map(|i| (ElementKind::Item, i.name.clone(), i.context.clone()));

    characters.chain(places).chain(events).chain(items).collect()
}

// ============================================================================
// Importer
// ============================================================================

/// Writes selected analysis results into a story store
pub struct ElementImporter {
    store: Arc<dyn StoryStore>,
}

impl ElementImporter {
    pub fn new(store: Arc<dyn StoryStore>) -> Self {
        Self { store }
    }

    /// Persist the selected elements of `analysis` for `novel_id`
    ///
    /// Store failures are collected in the report and the import carries on.
    pub async fn import(
        &self,
        novel_id: Uuid,
        analysis: &AnalysisResult,
        selection: &ImportSelection,
    ) -> ImportReport {
        let mut report = ImportReport::new(novel_id);

        for (kind, name, description) in rows(analysis) {
            // Event selections match the full sentence or the stored name
            let keep = selection.for_kind(kind);
            let selected = match kind {
                ElementKind::Event => keep.keeps(&name) || keep.keeps(&description),
                _ => keep.keeps(&name),
            };
            if !selected {
                continue;
            }

            match self
                .store
                .upsert_element(novel_id, kind, &name, &description)
                .await
            {
                Ok(outcome) => report.record(kind, name, outcome),
                Err(e) => {
                    tracing::warn!(
                        %novel_id,
                        %kind,
                        name = %name,
                        error = %e,
                        "failed to import element"
                    );
                    report.failures.push(ImportFailure {
                        kind,
                        name,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            %novel_id,
            store = self.store.name(),
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            failed = report.failures.len(),
            "imported analysis"
        );

        report
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analyze, ExtractedItem, ExtractedPlace};
    use quill_core::MemoryStore;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            characters: vec![
                ExtractedCharacter {
                    name: "Mary".to_string(),
                    dialogues: vec!["Hello there,".to_string()],
                    actions: vec![],
                },
                ExtractedCharacter {
                    name: "John".to_string(),
                    dialogues: vec![],
                    actions: vec!["John walked".to_string(), "John walked".to_string()],
                },
            ],
            places: vec![ExtractedPlace {
                name: "Rivendell".to_string(),
                context: "arrived at Rivendell".to_string(),
            }],
            events: vec![ExtractedEvent {
                text: "Then the Dragon attacked the village at night!".to_string(),
                importance: 2,
            }],
            items: vec![ExtractedItem {
                name: "ancient sword".to_string(),
                context: "The ancient sword glowed".to_string(),
            }],
        }
    }

    #[test]
    fn test_character_description() {
        let analysis = sample();
        assert_eq!(
            character_description(&analysis.characters[0]),
            "Says: \"Hello there,\""
        );
        assert_eq!(character_description(&analysis.characters[1]), "John walked");
    }

    #[test]
    fn test_event_name_truncated() {
        let event = ExtractedEvent {
            text: "word ".repeat(40),
            importance: 1,
        };
        let name = event_name(&event);
        assert!(name.chars().count() <= EVENT_NAME_LEN);
        assert!(!name.ends_with(' '));
    }

    #[test]
    fn test_short_event_name_is_sentence() {
        let event = ExtractedEvent {
            text: "Then the Dragon attacked the village at night!".to_string(),
            importance: 2,
        };
        assert_eq!(event_name(&event), event.text);
    }

    #[tokio::test]
    async fn test_events_sharing_prefix_stay_distinct() {
        let prefix =
            "Then the King rode out from the castle gates with all of his loyal knights behind";
        assert!(prefix.chars().count() >= EVENT_NAME_LEN);
        let analysis = AnalysisResult {
            events: vec![
                ExtractedEvent {
                    text: format!("{prefix} him at dawn."),
                    importance: 1,
                },
                ExtractedEvent {
                    text: format!("{prefix} him at dusk."),
                    importance: 1,
                },
            ],
            ..AnalysisResult::default()
        };

        let first = event_name(&analysis.events[0]);
        let second = event_name(&analysis.events[1]);
        assert_ne!(first, second);
        assert!(first.chars().count() <= EVENT_NAME_LEN);
        assert_eq!(first, event_name(&analysis.events[0]));

        let store = Arc::new(MemoryStore::new());
        let report = ElementImporter::new(store.clone())
            .import(Uuid::new_v4(), &analysis, &ImportSelection::all())
            .await;
        assert_eq!(report.created, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(store.len().await, 2);
    }

    #[test]
    fn test_selection_deserialize() {
        let selection: ImportSelection =
            serde_json::from_str(r#"{"characters": {"only": ["Mary"]}, "events": "none"}"#)
                .unwrap();

        assert_eq!(selection.characters, Selection::Only(vec!["Mary".to_string()]));
        assert_eq!(selection.events, Selection::None);
        assert_eq!(selection.places, Selection::All);
    }

    #[tokio::test]
    async fn test_import_all_then_again_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let importer = ElementImporter::new(store.clone());
        let novel = Uuid::new_v4();
        let analysis = sample();

        let first = importer.import(novel, &analysis, &ImportSelection::all()).await;
        assert_eq!(first.created, 5);
        assert!(first.failures.is_empty());

        let second = importer.import(novel, &analysis, &ImportSelection::all()).await;
        assert_eq!(second.created, 0);
        assert_eq!(second.unchanged, 5);
        assert_eq!(store.len().await, 5);
    }

    #[tokio::test]
    async fn test_import_respects_selection() {
        let store = Arc::new(MemoryStore::new());
        let importer = ElementImporter::new(store.clone());
        let novel = Uuid::new_v4();

        let selection = ImportSelection {
            characters: Selection::Only(vec!["Mary".to_string()]),
            places: Selection::None,
            events: Selection::None,
            items: Selection::All,
        };
        let report = importer.import(novel, &sample(), &selection).await;

        let names: Vec<&str> = report.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Mary", "ancient sword"]);
        assert_eq!(report.total(), 2);
    }

    #[tokio::test]
    async fn test_import_only_kinds() {
        let store = Arc::new(MemoryStore::new());
        let importer = ElementImporter::new(store.clone());
        let novel = Uuid::new_v4();

        let selection = ImportSelection::only_kinds(&[ElementKind::Place]);
        let report = importer.import(novel, &sample(), &selection).await;

        assert_eq!(report.created, 1);
        let stored = store
            .get_element(novel, ElementKind::Place, "Rivendell")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.description, "arrived at Rivendell");
    }

    #[tokio::test]
    async fn test_import_updates_changed_description() {
        let store = Arc::new(MemoryStore::new());
        let importer = ElementImporter::new(store.clone());
        let novel = Uuid::new_v4();

        store
            .upsert_element(novel, ElementKind::Place, "Rivendell", "a hidden valley")
            .await
            .unwrap();

        let report = importer
            .import(novel, &sample(), &ImportSelection::only_kinds(&[ElementKind::Place]))
            .await;
        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);
    }

    #[tokio::test]
    async fn test_import_empty_analysis() {
        let store = Arc::new(MemoryStore::new());
        let importer = ElementImporter::new(store.clone());

        let report = importer
            .import(Uuid::new_v4(), &analyze(""), &ImportSelection::all())
            .await;
        assert!(report.is_empty());
        assert!(store.is_empty().await);
    }
}
