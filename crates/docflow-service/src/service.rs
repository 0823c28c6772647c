//! The synchronous half of the enrichment pipeline.

use std::sync::Arc;
use tracing::{info, warn};

use docflow_core::messaging::{NotificationMessage, NotificationPublisher};
use docflow_core::store::DocumentStore;
use docflow_core::types::{Document, DocumentId, DocumentPatch, NewDocument};
use docflow_core::Result;
use docflow_enrich::describe;
use docflow_infra::AppMetrics;

/// Upper bound on the list page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default list page size.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Orchestrates store writes and creation notifications.
///
/// Create is deliberately two-phase and non-atomic: the document is
/// committed first, then the notification is published. A publish failure
/// never rolls the commit back — the document simply exists without a
/// guaranteed enrichment round-trip, which the synchronous description
/// already covers.
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    producer: Arc<dyn NotificationPublisher>,
    metrics: Arc<AppMetrics>,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        producer: Arc<dyn NotificationPublisher>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            store,
            producer,
            metrics,
        }
    }

    /// Create a document.
    ///
    /// The description is computed synchronously before the insert, so the
    /// response carries a populated `short_description` regardless of
    /// channel availability. The consumer will later re-derive the same
    /// value from the message snapshot as long as content is unchanged.
    pub async fn create(&self, input: NewDocument) -> Result<Document> {
        info!("Creating new document with title: {}", input.title);
        self.metrics.pipeline.documents_processed.inc();

        let description = describe(&input.content);
        let document = self
            .store
            .insert(input.with_short_description(description))
            .await?;

        let message = NotificationMessage::new(document.id, document.content.clone());
        if let Err(e) = self.producer.publish(&message).await {
            // The document is committed; enrichment just won't happen for
            // this one. Counted by the producer, logged here.
            warn!(
                "Failed to publish creation notification for document {}: {}",
                document.id, e
            );
        }

        Ok(document)
    }

    pub async fn get(&self, id: DocumentId) -> Result<Option<Document>> {
        self.store.get(id).await
    }

    /// List documents in id order with a bounded page size.
    pub async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Document>> {
        let limit = limit.min(MAX_PAGE_SIZE);
        self.store.list(skip, limit).await
    }

    /// Apply only the provided fields. The short description is NOT
    /// recomputed here, even when content changes.
    pub async fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<Option<Document>> {
        self.store.update(id, patch).await
    }

    /// Delete a document; returns whether a deletion occurred.
    pub async fn remove(&self, id: DocumentId) -> Result<bool> {
        self.store.delete(id).await
    }
}
