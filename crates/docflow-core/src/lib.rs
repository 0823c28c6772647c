pub mod config;
pub mod error;
pub mod messaging;
pub mod store;
pub mod types;

pub use config::{AppConfig, ConsumerConfig, DatabaseConfig, NatsSettings, ServerConfig};
pub use error::{AppError, Result};
pub use messaging::{MessageSource, NotificationMessage, NotificationPublisher};
pub use store::DocumentStore;
pub use types::{Document, DocumentId, DocumentPatch, NewDocument};
