//! Story element stores
//!
//! `MemoryStore` keeps elements in process memory. `FileStore` keeps the
//! same state and writes a JSON snapshot after every change, which is
//! enough for a single local writer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{ElementKind, QuillError, Result, StoryElement, StoryStore, UpsertOutcome};

/// Elements in insertion order
#[derive(Debug, Clone, Default)]
struct Elements {
    items: Vec<StoryElement>,
}

impl Elements {
    fn find(&self, novel_id: Uuid, kind: ElementKind, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|e| e.novel_id == novel_id && e.kind == kind && e.name == name)
    }

    fn upsert(
        &mut self,
        novel_id: Uuid,
        kind: ElementKind,
        name: &str,
        description: &str,
    ) -> Result<UpsertOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuillError::ValidationError(format!(
                "{kind} name must not be empty"
            )));
        }

        match self.find(novel_id, kind, name) {
            Some(idx) => {
                let existing = &mut self.items[idx];
                if existing.description == description {
                    Ok(UpsertOutcome::Unchanged(existing.id))
                } else {
                    existing.description = description.to_string();
                    existing.updated_at = Utc::now();
                    Ok(UpsertOutcome::Updated(existing.id))
                }
            }
            None => {
                let element = StoryElement::new(novel_id, kind, name, description);
                let id = element.id;
                self.items.push(element);
                Ok(UpsertOutcome::Created(id))
            }
        }
    }

    fn get(&self, novel_id: Uuid, kind: ElementKind, name: &str) -> Option<StoryElement> {
        self.find(novel_id, kind, name.trim())
            .map(|idx| self.items[idx].clone())
    }

    fn list(&self, novel_id: Uuid, kind: Option<ElementKind>) -> Vec<StoryElement> {
        self.items
            .iter()
            .filter(|e| e.novel_id == novel_id && kind.map_or(true, |k| e.kind == k))
            .cloned()
            .collect()
    }

    fn delete(&mut self, id: Uuid) -> Result<()> {
        let idx = self
            .items
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| QuillError::NotFound(id.to_string()))?;
        self.items.remove(idx);
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    elements: RwLock<Elements>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored elements across all novels
    pub async fn len(&self) -> usize {
        self.elements.read().await.items.len()
    }

    /// Whether the store holds nothing
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StoryStore for MemoryStore {
    async fn upsert_element(
        &self,
        novel_id: Uuid,
        kind: ElementKind,
        name: &str,
        description: &str,
    ) -> Result<UpsertOutcome> {
        let outcome = self
            .elements
            .write()
            .await
            .upsert(novel_id, kind, name, description)?;
        tracing::debug!(%novel_id, %kind, name, ?outcome, "upserted element");
        Ok(outcome)
    }

    async fn get_element(
        &self,
        novel_id: Uuid,
        kind: ElementKind,
        name: &str,
    ) -> Result<Option<StoryElement>> {
        Ok(self.elements.read().await.get(novel_id, kind, name))
    }

    async fn list_elements(
        &self,
        novel_id: Uuid,
        kind: Option<ElementKind>,
    ) -> Result<Vec<StoryElement>> {
        Ok(self.elements.read().await.list(novel_id, kind))
    }

    async fn delete_element(&self, id: Uuid) -> Result<()> {
        self.elements.write().await.delete(id)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Store persisted as a JSON array of elements
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    elements: RwLock<Elements>,
}

impl FileStore {
    /// Open a snapshot file, starting empty if it does not exist yet
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                QuillError::StorageError(format!("corrupt store {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), count = items.len(), "opened file store");

        Ok(Self {
            path,
            elements: RwLock::new(Elements { items }),
        })
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, elements: &Elements) -> Result<()> {
        let json = serde_json::to_vec_pretty(&elements.items)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write beside the target, then rename over it
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StoryStore for FileStore {
    async fn upsert_element(
        &self,
        novel_id: Uuid,
        kind: ElementKind,
        name: &str,
        description: &str,
    ) -> Result<UpsertOutcome> {
        let mut elements = self.elements.write().await;

        // Memory only changes once the snapshot is on disk
        let mut next = elements.clone();
        let outcome = next.upsert(novel_id, kind, name, description)?;
        if !matches!(outcome, UpsertOutcome::Unchanged(_)) {
            self.persist(&next).await?;
            *elements = next;
        }
        tracing::debug!(%novel_id, %kind, name, ?outcome, "upserted element");
        Ok(outcome)
    }

    async fn get_element(
        &self,
        novel_id: Uuid,
        kind: ElementKind,
        name: &str,
    ) -> Result<Option<StoryElement>> {
        Ok(self.elements.read().await.get(novel_id, kind, name))
    }

    async fn list_elements(
        &self,
        novel_id: Uuid,
        kind: Option<ElementKind>,
    ) -> Result<Vec<StoryElement>> {
        Ok(self.elements.read().await.list(novel_id, kind))
    }

    async fn delete_element(&self, id: Uuid) -> Result<()> {
        let mut elements = self.elements.write().await;
        let mut next = elements.clone();
        next.delete(id)?;
        self.persist(&next).await?;
        *elements = next;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let novel = Uuid::new_v4();

        let first = store
            .upsert_element(novel, ElementKind::Character, "Mary", "Says hello")
            .await
            .unwrap();
        let second = store
            .upsert_element(novel, ElementKind::Character, "Mary", "Says hello")
            .await
            .unwrap();

        assert!(matches!(first, UpsertOutcome::Created(_)));
        assert_eq!(second, UpsertOutcome::Unchanged(first.id()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_updates_description() {
        let store = MemoryStore::new();
        let novel = Uuid::new_v4();

        let created = store
            .upsert_element(novel, ElementKind::Place, "Rivendell", "old")
            .await
            .unwrap();
        let updated = store
            .upsert_element(novel, ElementKind::Place, "Rivendell", "new")
            .await
            .unwrap();

        assert_eq!(updated, UpsertOutcome::Updated(created.id()));
        let element = store
            .get_element(novel, ElementKind::Place, "Rivendell")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(element.description, "new");
    }

    #[tokio::test]
    async fn test_key_includes_novel_and_kind() {
        let store = MemoryStore::new();
        let novel_a = Uuid::new_v4();
        let novel_b = Uuid::new_v4();

        store
            .upsert_element(novel_a, ElementKind::Item, "ancient sword", "")
            .await
            .unwrap();
        store
            .upsert_element(novel_b, ElementKind::Item, "ancient sword", "")
            .await
            .unwrap();
        store
            .upsert_element(novel_a, ElementKind::Place, "ancient sword", "")
            .await
            .unwrap();

        assert_eq!(store.len().await, 3);
        assert_eq!(store.list_elements(novel_a, None).await.unwrap().len(), 2);
        assert_eq!(
            store
                .list_elements(novel_a, Some(ElementKind::Item))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let store = MemoryStore::new();
        let err = store
            .upsert_element(Uuid::new_v4(), ElementKind::Character, "   ", "")
            .await
            .unwrap_err();
        assert!(matches!(err, QuillError::ValidationError(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryStore::new();
        let novel = Uuid::new_v4();
        for name in ["Zed", "Amy", "Moe"] {
            store
                .upsert_element(novel, ElementKind::Character, name, "")
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list_elements(novel, None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Zed", "Amy", "Moe"]);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let store = MemoryStore::new();
        let err = store.delete_element(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, QuillError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("story.json");
        let novel = Uuid::new_v4();

        let id = {
            let store = FileStore::open(&path).await.unwrap();
            store
                .upsert_element(novel, ElementKind::Place, "Old Mill", "by the river")
                .await
                .unwrap()
                .id()
        };

        let reopened = FileStore::open(&path).await.unwrap();
        let element = reopened
            .get_element(novel, ElementKind::Place, "Old Mill")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(element.id, id);
        assert_eq!(element.description, "by the river");

        reopened.delete_element(id).await.unwrap();
        let again = FileStore::open(&path).await.unwrap();
        assert!(again.list_elements(novel, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, QuillError::StorageError(_)));
    }

    #[tokio::test]
    async fn test_file_store_failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");
        let blocker = dir.path().join("story.json.tmp");
        let novel = Uuid::new_v4();
        let store = FileStore::open(&path).await.unwrap();

        // A directory where the snapshot temp file goes makes every write fail
        std::fs::create_dir(&blocker).unwrap();
        let err = store
            .upsert_element(novel, ElementKind::Place, "Old Mill", "by the river")
            .await
            .unwrap_err();
        assert!(matches!(err, QuillError::Io(_)));
        assert!(store.list_elements(novel, None).await.unwrap().is_empty());

        std::fs::remove_dir(&blocker).unwrap();
        let retry = store
            .upsert_element(novel, ElementKind::Place, "Old Mill", "by the river")
            .await
            .unwrap();
        assert!(matches!(retry, UpsertOutcome::Created(_)));

        let reopened = FileStore::open(&path).await.unwrap();
        assert!(reopened
            .get_element(novel, ElementKind::Place, "Old Mill")
            .await
            .unwrap()
            .is_some());

        // A failed delete keeps the element
        std::fs::create_dir(&blocker).unwrap();
        assert!(store.delete_element(retry.id()).await.is_err());
        assert_eq!(store.list_elements(novel, None).await.unwrap().len(), 1);
    }
}
