//! Worker wiring and lifecycle
//!
//! Startup acquires the store pool and channel subscription under a
//! bounded fixed-delay retry budget; once the budget is exhausted the
//! error propagates and the process exits nonzero. After startup the
//! poll loop runs until SIGINT or SIGTERM cancels the shutdown token.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use docflow_consumer::{EnrichmentWorker, WorkerConfig};
use docflow_core::config::AppConfig;
use docflow_infra::{
    create_pool, AppMetrics, NatsConfig, NatsMessageSource, NatsPublisher, NatsSubscriber,
    PgDocumentStore, RetryPolicy,
};

use crate::cli::Args;

pub struct App {
    config: AppConfig,
    metrics: Arc<AppMetrics>,
}

impl App {
    pub async fn build(args: Args) -> Result<Self> {
        let config = match &args.config {
            Some(path) => AppConfig::load_from_file(&path.to_string_lossy())
                .context("Failed to load configuration file")?,
            None => AppConfig::load().context("Failed to load configuration")?,
        };

        Ok(Self {
            config,
            metrics: Arc::new(AppMetrics::new()),
        })
    }

    pub async fn run(self) -> Result<()> {
        let shutdown = CancellationToken::new();
        spawn_signal_watcher(shutdown.clone());

        let retry = RetryPolicy::fixed(
            self.config.consumer.startup_max_retries,
            self.config.consumer.startup_retry_delay(),
        );

        info!(
            "Acquiring subscription to {} (queue: {})",
            self.config.nats.topic, self.config.nats.queue_group
        );

        let (store, source) = retry
            .execute(|| acquire_resources(&self.config))
            .await
            .context("Worker startup failed; retry budget exhausted")?;

        let mut worker = EnrichmentWorker::new(
            store,
            source,
            self.metrics.clone(),
            shutdown,
            WorkerConfig::from(&self.config.consumer),
        );

        worker.run().await;

        Ok(())
    }
}

/// One startup attempt: store pool, channel connection, queue-group
/// subscription. Any failure throws the whole attempt away.
async fn acquire_resources(
    config: &AppConfig,
) -> docflow_infra::Result<(Arc<PgDocumentStore>, NatsMessageSource)> {
    let pool = create_pool(&config.database).await?;
    let store = Arc::new(PgDocumentStore::new(pool));

    let publisher = NatsPublisher::new(NatsConfig::new(&config.nats.url).with_name("docflow-worker")).await?;
    let subscriber = NatsSubscriber::new_queue(
        publisher.client(),
        config.nats.topic.clone(),
        config.nats.queue_group.clone(),
    )
    .await?;

    Ok((store, NatsMessageSource::new(subscriber)))
}

fn spawn_signal_watcher(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install SIGINT handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT, shutting down"),
            _ = terminate => info!("Received SIGTERM, shutting down"),
        }

        shutdown.cancel();
    });
}
