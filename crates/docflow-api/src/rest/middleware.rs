//! Request metrics middleware.

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use std::time::Instant;

use crate::AppState;

/// Record per-request totals (method/endpoint/status) and duration.
///
/// The endpoint label is the matched route template, not the raw path, so
/// `/api/v1/documents/17` and `/api/v1/documents/42` share a series.
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let start = Instant::now();
    state.metrics.http.requests_in_progress.inc();

    let response = next.run(request).await;

    state.metrics.http.requests_in_progress.dec();
    state
        .metrics
        .http
        .record_request(&method, &endpoint, response.status().as_u16(), start.elapsed())
        .await;

    response
}
