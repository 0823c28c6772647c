//! Error-to-response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use docflow_core::AppError;

/// API-facing error. Validation failures carry field locations; anything
/// unexpected collapses to a generic 500 body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(ValidationErrors),

    #[error(transparent)]
    App(#[from] AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let detail: Vec<_> = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            json!({
                                "loc": ["body", field],
                                "msg": e
                                    .message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| "invalid value".to_string()),
                                "type": "value_error",
                            })
                        })
                    })
                    .collect();

                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": detail })),
                )
                    .into_response()
            }
            ApiError::App(AppError::Validation(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": [{ "loc": ["body"], "msg": msg, "type": "value_error" }]
                })),
            )
                .into_response(),
            ApiError::App(AppError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Document not found" })),
            )
                .into_response(),
            ApiError::App(err) => {
                error!("Unhandled error serving request: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}
