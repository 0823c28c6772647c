//! Messaging abstractions for the enrichment pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;
use crate::types::DocumentId;

/// Fire-and-forget fact published when a document is created.
///
/// Immutable once published. Carries a content snapshot taken at creation
/// time; the authoritative content lives in the document store, so the
/// snapshot may be stale by the time a consumer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub document_id: DocumentId,
    pub content: String,
}

impl NotificationMessage {
    pub fn new(document_id: DocumentId, content: impl Into<String>) -> Self {
        Self {
            document_id,
            content: content.into(),
        }
    }
}

/// Trait for publishing creation notifications to the message channel.
///
/// Implementations count sent/failed messages and propagate transport
/// errors to the caller. Retry policy, if any, belongs to the caller or to
/// the channel's own delivery guarantees — never to the publisher itself.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn publish(&self, message: &NotificationMessage) -> Result<()>;
}

/// Trait for fetching raw message payloads from the channel.
///
/// `recv_batch` waits up to `wait` for at least one message, then drains
/// whatever else is immediately available, up to `max`. An empty vec means
/// the wait elapsed with nothing to deliver; a transport error means the
/// channel is currently unavailable and the caller should back off and
/// retry rather than terminate.
#[async_trait]
pub trait MessageSource: Send {
    async fn recv_batch(&mut self, wait: Duration, max: usize) -> Result<Vec<Vec<u8>>>;
}
