//! Postgres document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use docflow_core::store::DocumentStore;
use docflow_core::types::{Document, DocumentId, DocumentPatch, NewDocument};
use docflow_core::Result;

use crate::InfraError;

const DOCUMENT_COLUMNS: &str = "id, title, content, short_description, created_at, updated_at";

/// Document store backed by Postgres via sqlx.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_document(row: &PgRow) -> std::result::Result<Document, sqlx::Error> {
    Ok(Document {
        id: DocumentId::new(row.try_get::<i64, _>("id")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        short_description: row.try_get("short_description")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        debug!("Inserting document with title: {}", doc.title);

        let row = sqlx::query(&format!(
            "INSERT INTO documents (title, content, short_description) \
             VALUES ($1, $2, $3) RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(&doc.short_description)
        .fetch_one(&self.pool)
        .await
        .map_err(InfraError::Database)?;

        Ok(row_to_document(&row).map_err(InfraError::Database)?)
    }

    async fn get(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(InfraError::Database)?;

        match row {
            Some(row) => Ok(Some(row_to_document(&row).map_err(InfraError::Database)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(skip as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(InfraError::Database)?;

        rows.iter()
            .map(|row| Ok(row_to_document(row).map_err(InfraError::Database)?))
            .collect()
    }

    async fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<Option<Document>> {
        // COALESCE applies only the provided fields in one atomic update.
        let row = sqlx::query(&format!(
            "UPDATE documents SET \
                 title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 short_description = COALESCE($4, short_description), \
                 updated_at = now() \
             WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.short_description)
        .fetch_optional(&self.pool)
        .await
        .map_err(InfraError::Database)?;

        match row {
            Some(row) => Ok(Some(row_to_document(&row).map_err(InfraError::Database)?)),
            None => Ok(None),
        }
    }

    async fn set_short_description(&self, id: DocumentId, description: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE documents SET short_description = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(InfraError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: DocumentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(InfraError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
