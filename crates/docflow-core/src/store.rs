//! Document store seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Document, DocumentId, DocumentPatch, NewDocument};

/// Durable CRUD + list/paginate over documents.
///
/// The store is the single owner of document state. Updates are atomic
/// from the store's perspective; a `short_description`, once set, always
/// reflects some complete snapshot of content.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return it with its store-assigned id.
    async fn insert(&self, doc: NewDocument) -> Result<Document>;

    /// Fetch a document by id.
    async fn get(&self, id: DocumentId) -> Result<Option<Document>>;

    /// List documents in id (insertion) order.
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Document>>;

    /// Apply only the provided fields; returns `None` if the document does
    /// not exist.
    async fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<Option<Document>>;

    /// Atomically persist a derived description. Returns whether the
    /// document existed.
    async fn set_short_description(&self, id: DocumentId, description: &str) -> Result<bool>;

    /// Delete a document; returns whether a deletion occurred.
    async fn delete(&self, id: DocumentId) -> Result<bool>;
}
