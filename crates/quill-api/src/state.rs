//! Application state management

use quill_analyzer::{ElementImporter, TextAnalyzer};
use quill_core::config::AppConfig;
use quill_core::{MemoryStore, StoryStore};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::AppError;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Analyses performed
    pub analysis_count: AtomicU64,
    /// Ready status
    pub is_ready: AtomicBool,
    /// Analyzer built from `config.analyzer`
    pub analyzer: TextAnalyzer,
    /// Story element store
    pub store: Arc<dyn StoryStore>,
}

impl AppState {
    /// Create new application state with config and store
    pub fn new(config: AppConfig, store: Arc<dyn StoryStore>) -> Self {
        let analyzer = TextAnalyzer::with_config(&config.analyzer);
        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            analysis_count: AtomicU64::new(0),
            is_ready: AtomicBool::new(true),
            analyzer,
            store,
        }
    }

    /// State backed by an in-memory store
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get total analysis count
    pub fn get_analysis_count(&self) -> u64 {
        self.analysis_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }

    /// Analyze chapter text, enforcing the configured input cap
    pub fn analyze(&self, content: Option<&str>) -> Result<quill_analyzer::AnalysisResult, AppError> {
        let text = content.unwrap_or_default();
        let max = self.config.analyzer.max_input_chars;
        if text.len() > max && text.chars().count() > max {
            return Err(AppError::BadRequest(format!(
                "content exceeds {max} characters"
            )));
        }

        self.analysis_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.analyzer.analyze(text))
    }

    /// Importer writing into this state's store
    pub fn importer(&self) -> ElementImporter {
        ElementImporter::new(self.store.clone())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(AppConfig::default())
    }
}
