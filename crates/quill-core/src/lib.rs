//! Quill Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Quill:
//! - Story element models (characters, places, events, items)
//! - Common error types
//! - The storage trait for novel-scoped story elements
//! - Configuration management

pub mod config;
pub mod store;

pub use config::{AnalyzerConfig, AppConfig, ConfigError, LoggingConfig, ServerConfig, StorageConfig};
pub use store::{FileStore, MemoryStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Quill operations
#[derive(Error, Debug)]
pub enum QuillError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for QuillError {
    fn from(err: ConfigError) -> Self {
        QuillError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuillError>;

// ============================================================================
// Story Elements
// ============================================================================

/// Category of a story element kept alongside a novel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Character,
    Place,
    Event,
    Item,
}

impl ElementKind {
    /// All kinds, in the order the analyzer reports them
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Character,
        ElementKind::Place,
        ElementKind::Event,
        ElementKind::Item,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Place => "place",
            Self::Event => "event",
            Self::Item => "item",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = QuillError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "character" | "characters" => Ok(Self::Character),
            "place" | "places" => Ok(Self::Place),
            "event" | "events" => Ok(Self::Event),
            "item" | "items" => Ok(Self::Item),
            other => Err(QuillError::ValidationError(format!(
                "unknown element kind: {other}"
            ))),
        }
    }
}

/// A story element stored for a novel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryElement {
    /// Unique identifier
    pub id: Uuid,

    /// Owning novel
    pub novel_id: Uuid,

    /// Element category
    pub kind: ElementKind,

    /// Display name, unique per (novel, kind)
    pub name: String,

    /// Free-form description
    pub description: String,

    /// When this element was created
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoryElement {
    /// Create a new element
    pub fn new(
        novel_id: Uuid,
        kind: ElementKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            novel_id,
            kind,
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of an idempotent upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// A new element was stored
    Created(Uuid),
    /// An existing element had its description replaced
    Updated(Uuid),
    /// An identical element already existed
    Unchanged(Uuid),
}

impl UpsertOutcome {
    /// Id of the stored element
    pub fn id(&self) -> Uuid {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Unchanged(id) => *id,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Novel-scoped storage for story elements
///
/// Upserts are idempotent on `(novel_id, kind, name)`.
#[async_trait::async_trait]
pub trait StoryStore: Send + Sync {
    /// Insert an element or replace the description of the existing one
    async fn upsert_element(
        &self,
        novel_id: Uuid,
        kind: ElementKind,
        name: &str,
        description: &str,
    ) -> Result<UpsertOutcome>;

    /// Look up an element by its natural key
    async fn get_element(
        &self,
        novel_id: Uuid,
        kind: ElementKind,
        name: &str,
    ) -> Result<Option<StoryElement>>;

    /// List a novel's elements in insertion order, optionally by kind
    async fn list_elements(
        &self,
        novel_id: Uuid,
        kind: Option<ElementKind>,
    ) -> Result<Vec<StoryElement>>;

    /// Delete an element by id
    async fn delete_element(&self, id: Uuid) -> Result<()>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
