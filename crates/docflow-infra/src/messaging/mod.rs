//! Message channel adapters
//!
//! NATS transport plus the creation-notification producer.

pub mod nats;
pub mod producer;

pub use nats::{NatsConfig, NatsMessageSource, NatsPublisher, NatsSubscriber};
pub use producer::NotificationProducer;
