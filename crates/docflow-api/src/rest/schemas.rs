//! Request and response schemas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use docflow_core::types::{Document, DocumentId, DocumentPatch, NewDocument};

/// Body for `POST /documents`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub short_description: Option<String>,
}

impl From<CreateDocumentRequest> for NewDocument {
    fn from(req: CreateDocumentRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            short_description: req.short_description,
        }
    }
}

/// Body for `PUT /documents/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub short_description: Option<String>,
}

impl From<UpdateDocumentRequest> for DocumentPatch {
    fn from(req: UpdateDocumentRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            short_description: req.short_description,
        }
    }
}

/// Pagination query for `GET /documents`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    docflow_service::service::DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content: doc.content,
            short_description: doc.short_description,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateDocumentRequest {
            title: "T".to_string(),
            content: String::new(),
            short_description: None,
        };
        assert!(valid.validate().is_ok());

        let empty_title = CreateDocumentRequest {
            title: String::new(),
            content: String::new(),
            short_description: None,
        };
        assert!(empty_title.validate().is_err());

        let long_title = CreateDocumentRequest {
            title: "x".repeat(201),
            content: String::new(),
            short_description: None,
        };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_update_request_absent_title_is_valid() {
        assert!(UpdateDocumentRequest::default().validate().is_ok());

        let bad = UpdateDocumentRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_content_defaults_to_empty() {
        let req: CreateDocumentRequest = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert_eq!(req.content, "");
    }
}
