//! Route handlers.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use docflow_core::types::DocumentId;
use docflow_core::AppError;

use crate::rest::error::ApiError;
use crate::rest::schemas::{
    CreateDocumentRequest, DocumentResponse, ListParams, UpdateDocumentRequest,
};
use crate::AppState;

pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    state
        .metrics
        .http
        .document_size
        .observe(req.content.len() as f64);

    let document = state.service.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(document.into())))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state
        .service
        .get(DocumentId::new(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("document {}", id)))?;

    Ok(Json(document.into()))
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = state.service.list(params.skip, params.limit).await?;
    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let document = state
        .service
        .update(DocumentId::new(id), req.into())
        .await?
        .ok_or_else(|| AppError::not_found(format!("document {}", id)))?;

    Ok(Json(document.into()))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.service.remove(DocumentId::new(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("document {}", id)).into())
    }
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render().await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
