//! REST API layer
//!
//! Axum routes delegating to the document service, with validation,
//! request metrics, and Prometheus exposition.

pub mod rest;

use std::sync::Arc;

use docflow_infra::AppMetrics;
use docflow_service::DocumentService;

pub use rest::router::create_router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DocumentService>,
    pub metrics: Arc<AppMetrics>,
}

impl AppState {
    pub fn new(service: Arc<DocumentService>, metrics: Arc<AppMetrics>) -> Self {
        Self { service, metrics }
    }
}
