pub mod messaging;
pub mod metrics;
pub mod resilience;
pub mod store;

pub use messaging::nats::{NatsConfig, NatsMessageSource, NatsPublisher, NatsSubscriber};
pub use messaging::producer::NotificationProducer;

pub use store::memory::MemoryDocumentStore;
pub use store::pool::{create_pool, run_migrations};
pub use store::postgres::PgDocumentStore;

pub use metrics::{AppMetrics, Counter, Gauge, Histogram, HistogramTimer, HttpMetrics, PipelineMetrics};

pub use resilience::retry::{RetryConfig, RetryPolicy};

use docflow_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, InfraError>;

// Convert to the core error taxonomy
impl From<InfraError> for AppError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Database(e) => AppError::store(e.to_string()),
            InfraError::Messaging(msg) => AppError::transport(msg),
            InfraError::Serialization(e) => AppError::malformed(e.to_string()),
            InfraError::Configuration(msg) => AppError::internal(msg),
            InfraError::Internal(msg) => AppError::internal(msg),
        }
    }
}
