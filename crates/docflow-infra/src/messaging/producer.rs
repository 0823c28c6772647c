//! Creation-notification producer.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

use docflow_core::messaging::{NotificationMessage, NotificationPublisher};
use docflow_core::AppError;

use crate::messaging::nats::NatsPublisher;
use crate::metrics::AppMetrics;

/// Publishes `{document_id, content}` notifications under a fixed topic.
///
/// No internal retry: a transport failure is counted, logged, and
/// propagated to the caller. The caller decides what that means — for
/// document creation it means "log and move on", since the document is
/// already committed.
pub struct NotificationProducer {
    publisher: NatsPublisher,
    topic: String,
    metrics: Arc<AppMetrics>,
}

impl NotificationProducer {
    pub fn new(publisher: NatsPublisher, topic: impl Into<String>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            metrics,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl NotificationPublisher for NotificationProducer {
    async fn publish(&self, message: &NotificationMessage) -> docflow_core::Result<()> {
        debug!(
            "Sending notification for document {} to topic {}",
            message.document_id, self.topic
        );

        let payload =
            serde_json::to_vec(message).map_err(|e| AppError::internal(e.to_string()))?;

        match self.publisher.publish_raw(&self.topic, payload).await {
            Ok(()) => {
                self.metrics.pipeline.messages_sent.inc();
                Ok(())
            }
            Err(e) => {
                error!(
                    "Failed to send notification for document {}: {}",
                    message.document_id, e
                );
                self.metrics.pipeline.messages_failed.inc();
                Err(e.into())
            }
        }
    }
}
