//! In-memory document store
//!
//! Backs development and tests with the same semantics as the Postgres
//! store: id-ordered listing, monotonic ids, atomic updates.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use docflow_core::store::DocumentStore;
use docflow_core::types::{Document, DocumentId, DocumentPatch, NewDocument};
use docflow_core::Result;

struct Inner {
    next_id: i64,
    documents: BTreeMap<i64, Document>,
}

/// In-memory store over a `RwLock`-guarded ordered map.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                next_id: 1,
                documents: BTreeMap::new(),
            })),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.documents.is_empty()
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = Utc::now();
        let document = Document {
            id: DocumentId::new(id),
            title: doc.title,
            content: doc.content,
            short_description: doc.short_description,
            created_at: now,
            updated_at: now,
        };

        inner.documents.insert(id, document.clone());
        debug!("Inserted document {}", id);
        Ok(document)
    }

    async fn get(&self, id: DocumentId) -> Result<Option<Document>> {
        let inner = self.inner.read().await;
        Ok(inner.documents.get(&id.as_i64()).cloned())
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Document>> {
        let inner = self.inner.read().await;
        Ok(inner
            .documents
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<Option<Document>> {
        let mut inner = self.inner.write().await;
        let Some(document) = inner.documents.get_mut(&id.as_i64()) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            document.title = title;
        }
        if let Some(content) = patch.content {
            document.content = content;
        }
        if let Some(short_description) = patch.short_description {
            document.short_description = Some(short_description);
        }
        document.updated_at = Utc::now();

        Ok(Some(document.clone()))
    }

    async fn set_short_description(&self, id: DocumentId, description: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(document) = inner.documents.get_mut(&id.as_i64()) else {
            return Ok(false);
        };

        document.short_description = Some(description.to_string());
        document.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, id: DocumentId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.documents.remove(&id.as_i64()).is_some();
        if removed {
            debug!("Deleted document {}", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_monotonic_ids() {
        let store = MemoryDocumentStore::new();
        let a = store.insert(NewDocument::new("A", "")).await.unwrap();
        let b = store.insert(NewDocument::new("B", "")).await.unwrap();
        assert!(b.id.as_i64() > a.id.as_i64());
        assert_eq!(a.updated_at, a.created_at);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = MemoryDocumentStore::new();
        assert!(store.get(DocumentId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pagination_in_insertion_order() {
        let store = MemoryDocumentStore::new();
        for i in 0..5 {
            store
                .insert(NewDocument::new(format!("Document {}", i), ""))
                .await
                .unwrap();
        }

        let page = store.list(2, 2).await.unwrap();
        let titles: Vec<_> = page.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Document 2", "Document 3"]);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let store = MemoryDocumentStore::new();
        let doc = store
            .insert(NewDocument::new("Old", "body").with_short_description("desc"))
            .await
            .unwrap();

        let patch = DocumentPatch {
            title: Some("New".to_string()),
            ..Default::default()
        };
        let updated = store.update(doc.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "body");
        assert_eq!(updated.short_description.as_deref(), Some("desc"));
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryDocumentStore::new();
        let result = store
            .update(DocumentId::new(1), DocumentPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_short_description() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert(NewDocument::new("T", "body")).await.unwrap();

        assert!(store
            .set_short_description(doc.id, "a summary")
            .await
            .unwrap());
        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.short_description.as_deref(), Some("a summary"));

        assert!(!store
            .set_short_description(DocumentId::new(42), "x")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_semantics() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert(NewDocument::new("T", "")).await.unwrap();

        assert!(store.delete(doc.id).await.unwrap());
        assert!(store.get(doc.id).await.unwrap().is_none());
        assert!(!store.delete(doc.id).await.unwrap());
    }
}
