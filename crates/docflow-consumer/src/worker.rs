//! The consumer poll loop and per-message handling.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use docflow_core::config::ConsumerConfig;
use docflow_core::messaging::MessageSource;
use docflow_core::store::DocumentStore;
use docflow_core::types::DocumentId;
use docflow_core::Result;
use docflow_enrich::describe;
use docflow_infra::AppMetrics;

/// Worker lifecycle states.
///
/// Starting covers subscription/store acquisition (handled by the process
/// wiring with a bounded retry budget). Stopping is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Running,
    Stopping,
}

/// Poll loop tuning.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bounded wait for a batch of messages
    pub poll_wait: Duration,
    /// Pause after a poll-level transport error
    pub poll_backoff: Duration,
    /// Maximum messages drained per poll
    pub batch_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_wait: Duration::from_secs(1),
            poll_backoff: Duration::from_secs(1),
            batch_size: 64,
        }
    }
}

impl From<&ConsumerConfig> for WorkerConfig {
    fn from(config: &ConsumerConfig) -> Self {
        Self {
            poll_wait: config.poll_wait(),
            poll_backoff: config.poll_backoff(),
            batch_size: config.batch_size,
        }
    }
}

/// Consumes creation notifications and persists derived summaries.
///
/// Errors never escape the per-message boundary: an undecodable payload,
/// a missing field, an unknown document, or a store failure is counted in
/// the failure metric and the loop moves on. Poll-level transport errors
/// cause a brief backoff, never termination.
pub struct EnrichmentWorker<S: MessageSource> {
    store: Arc<dyn DocumentStore>,
    source: S,
    metrics: Arc<AppMetrics>,
    shutdown: CancellationToken,
    config: WorkerConfig,
    state: WorkerState,
}

impl<S: MessageSource> EnrichmentWorker<S> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        source: S,
        metrics: Arc<AppMetrics>,
        shutdown: CancellationToken,
        config: WorkerConfig,
    ) -> Self {
        Self {
            store,
            source,
            metrics,
            shutdown,
            config,
            state: WorkerState::Starting,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run the poll loop until the cancellation token fires.
    ///
    /// The token is checked once per iteration; in-flight message
    /// processing is never interrupted.
    pub async fn run(&mut self) {
        info!("Starting to consume messages");
        self.state = WorkerState::Running;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            match self
                .source
                .recv_batch(self.config.poll_wait, self.config.batch_size)
                .await
            {
                Ok(batch) => {
                    if !batch.is_empty() {
                        debug!("Received {} messages", batch.len());
                    }
                    for payload in &batch {
                        self.handle(payload).await;
                    }
                }
                Err(e) => {
                    error!("Error polling messages: {}", e);
                    tokio::time::sleep(self.config.poll_backoff).await;
                }
            }
        }

        self.state = WorkerState::Stopping;
        info!("Stop requested; closing subscription");
    }

    /// Process one message. Never propagates an error.
    async fn handle(&self, payload: &[u8]) {
        let _timer = self.metrics.pipeline.processing_time.start_timer();

        let data: Value = match serde_json::from_slice(payload) {
            Ok(data) => data,
            Err(e) => {
                warn!("Discarding undecodable message: {}", e);
                self.metrics.pipeline.processing_failed.inc();
                return;
            }
        };

        let id = data.get("document_id").and_then(Value::as_i64);
        let content = data.get("content").and_then(Value::as_str);
        let (id, content) = match (id, content) {
            (Some(id), Some(content)) => (DocumentId::new(id), content),
            _ => {
                warn!("Invalid message format: {}", data);
                self.metrics.pipeline.processing_failed.inc();
                return;
            }
        };

        debug!("Processing message for document {}", id);

        match self.enrich(id, content).await {
            Ok(true) => self.metrics.pipeline.processing_success.inc(),
            Ok(false) => {
                warn!("Document {} not found in store", id);
                self.metrics.pipeline.processing_failed.inc();
            }
            Err(e) => {
                error!("Error processing message for document {}: {}", id, e);
                self.metrics.pipeline.processing_failed.inc();
            }
        }
    }

    /// Derive the summary from the message's content snapshot and persist
    /// it. Returns whether the document existed.
    ///
    /// The snapshot is used deliberately — no fresh read of current
    /// content. If the document changed since creation the persisted
    /// summary describes the snapshot, which is the accepted behavior.
    async fn enrich(&self, id: DocumentId, content: &str) -> Result<bool> {
        if self.store.get(id).await?.is_none() {
            return Ok(false);
        }

        let description = describe(content);
        self.store.set_short_description(id, &description).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docflow_core::types::NewDocument;
    use docflow_core::AppError;
    use docflow_infra::MemoryDocumentStore;
    use tokio::sync::mpsc;

    /// Message source backed by an in-process channel.
    struct ChannelSource {
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
    }

    #[async_trait]
    impl MessageSource for ChannelSource {
        async fn recv_batch(&mut self, wait: Duration, max: usize) -> Result<Vec<Vec<u8>>> {
            let mut batch = Vec::new();
            match tokio::time::timeout(wait, self.rx.recv()).await {
                Err(_) => return Ok(batch),
                Ok(None) => return Err(AppError::transport("channel closed")),
                Ok(Some(payload)) => batch.push(payload),
            }
            while batch.len() < max {
                match self.rx.try_recv() {
                    Ok(payload) => batch.push(payload),
                    Err(_) => break,
                }
            }
            Ok(batch)
        }
    }

    /// Source whose transport is permanently down.
    struct BrokenSource;

    #[async_trait]
    impl MessageSource for BrokenSource {
        async fn recv_batch(&mut self, _wait: Duration, _max: usize) -> Result<Vec<Vec<u8>>> {
            Err(AppError::transport("channel unavailable"))
        }
    }

    fn test_config() -> WorkerConfig {
        WorkerConfig {
            poll_wait: Duration::from_millis(10),
            poll_backoff: Duration::from_millis(10),
            batch_size: 16,
        }
    }

    fn worker_with_source<S: MessageSource>(
        store: Arc<MemoryDocumentStore>,
        source: S,
        token: CancellationToken,
    ) -> (EnrichmentWorker<S>, Arc<AppMetrics>) {
        let metrics = Arc::new(AppMetrics::new());
        let worker = EnrichmentWorker::new(store, source, metrics.clone(), token, test_config());
        (worker, metrics)
    }

    fn idle_worker(
        store: Arc<MemoryDocumentStore>,
    ) -> (EnrichmentWorker<ChannelSource>, Arc<AppMetrics>) {
        let (_tx, rx) = mpsc::unbounded_channel();
        // Token is never cancelled; these tests call handle() directly.
        worker_with_source(store, ChannelSource { rx }, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_valid_message_enriches_document() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = store.insert(NewDocument::new("T", "a b c")).await.unwrap();
        let (worker, metrics) = idle_worker(store.clone());

        let payload = format!(r#"{{"document_id": {}, "content": "a b c"}}"#, doc.id);
        worker.handle(payload.as_bytes()).await;

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(
            stored.short_description.as_deref(),
            Some("Document contains 3 words and 5 characters")
        );
        assert_eq!(metrics.pipeline.processing_success.get(), 1);
        assert_eq!(metrics.pipeline.processing_failed.get(), 0);
        assert_eq!(metrics.pipeline.processing_time.get_count(), 1);
    }

    #[tokio::test]
    async fn test_summary_uses_message_snapshot_not_current_content() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = store.insert(NewDocument::new("T", "a b c")).await.unwrap();
        let (worker, _) = idle_worker(store.clone());

        // Snapshot from creation time; the stored content has since moved on.
        store
            .update(
                doc.id,
                docflow_core::types::DocumentPatch {
                    content: Some("now much longer replacement content".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let payload = format!(r#"{{"document_id": {}, "content": "a b c"}}"#, doc.id);
        worker.handle(payload.as_bytes()).await;

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(
            stored.short_description.as_deref(),
            Some("Document contains 3 words and 5 characters")
        );
    }

    #[tokio::test]
    async fn test_unknown_document_counts_failure_without_side_effects() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (worker, metrics) = idle_worker(store.clone());

        worker
            .handle(br#"{"document_id": 999, "content": "a b c"}"#)
            .await;

        assert_eq!(metrics.pipeline.processing_failed.get(), 1);
        assert_eq!(metrics.pipeline.processing_success.get(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_discarded() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (worker, metrics) = idle_worker(store);

        worker.handle(b"not json at all").await;

        assert_eq!(metrics.pipeline.processing_failed.get(), 1);
        assert_eq!(metrics.pipeline.processing_success.get(), 0);
    }

    #[tokio::test]
    async fn test_missing_fields_are_discarded() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (worker, metrics) = idle_worker(store);

        worker.handle(br#"{"content": "orphan"}"#).await;
        worker.handle(br#"{"document_id": 1}"#).await;
        worker.handle(br#"{"document_id": "not a number", "content": "x"}"#).await;

        assert_eq!(metrics.pipeline.processing_failed.get(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = store.insert(NewDocument::new("T", "a b c")).await.unwrap();
        let (worker, metrics) = idle_worker(store.clone());

        let payload = format!(r#"{{"document_id": {}, "content": "a b c"}}"#, doc.id);
        worker.handle(payload.as_bytes()).await;
        worker.handle(payload.as_bytes()).await;

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(
            stored.short_description.as_deref(),
            Some("Document contains 3 words and 5 characters")
        );
        assert_eq!(metrics.pipeline.processing_success.get(), 2);
    }

    #[tokio::test]
    async fn test_one_bad_message_never_aborts_the_batch() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = store.insert(NewDocument::new("T", "hello")).await.unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let (mut worker, metrics) =
            worker_with_source(store.clone(), ChannelSource { rx }, token.clone());

        tx.send(b"garbage".to_vec()).unwrap();
        tx.send(br#"{"document_id": 424242, "content": "x"}"#.to_vec())
            .unwrap();
        tx.send(
            format!(r#"{{"document_id": {}, "content": "hello"}}"#, doc.id).into_bytes(),
        )
        .unwrap();

        let handle = tokio::spawn(async move {
            worker.run().await;
            worker
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        let worker = handle.await.unwrap();

        assert_eq!(worker.state(), WorkerState::Stopping);
        assert_eq!(metrics.pipeline.processing_failed.get(), 2);
        assert_eq!(metrics.pipeline.processing_success.get(), 1);

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(
            stored.short_description.as_deref(),
            Some("Document contains 1 words and 5 characters")
        );
    }

    #[tokio::test]
    async fn test_poll_errors_back_off_without_terminating() {
        let store = Arc::new(MemoryDocumentStore::new());
        let token = CancellationToken::new();
        let (mut worker, _) = worker_with_source(store, BrokenSource, token.clone());

        let handle = tokio::spawn(async move {
            worker.run().await;
            worker
        });

        // Several backoff cycles pass; the loop must still be alive.
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!handle.is_finished());

        token.cancel();
        let worker = handle.await.unwrap();
        assert_eq!(worker.state(), WorkerState::Stopping);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (_tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let token = CancellationToken::new();
        let (mut worker, _) = worker_with_source(store, ChannelSource { rx }, token.clone());

        let handle = tokio::spawn(async move {
            worker.run().await;
            worker
        });

        token.cancel();
        let worker = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop promptly after cancellation")
            .unwrap();
        assert_eq!(worker.state(), WorkerState::Stopping);
    }
}
