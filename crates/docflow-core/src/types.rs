use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

// Newtype wrapper for type safety over store-assigned integer ids.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(i64);

impl DocumentId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DocumentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The persisted text entity with its derived summary.
///
/// Owned exclusively by the document store; services and the worker only
/// ever hold transient copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    /// Derived summary. Absent until enrichment (or the synchronous
    /// description at creation time) has populated it.
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a document. Validation happens upstream in the
/// schema layer; by the time this reaches the store it is well-formed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub short_description: Option<String>,
}

impl NewDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            short_description: None,
        }
    }

    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = Some(description.into());
        self
    }
}

/// Partial update. Only fields that are `Some` are applied; everything
/// else is left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub short_description: Option<String>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.short_description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_roundtrip() {
        let id = DocumentId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(DocumentId::from(42), id);
    }

    #[test]
    fn test_document_id_serializes_as_integer() {
        let id = DocumentId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: DocumentId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_new_document_builder() {
        let doc = NewDocument::new("Title", "body").with_short_description("summary");
        assert_eq!(doc.title, "Title");
        assert_eq!(doc.content, "body");
        assert_eq!(doc.short_description.as_deref(), Some("summary"));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(DocumentPatch::default().is_empty());
        let patch = DocumentPatch {
            title: Some("X".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
