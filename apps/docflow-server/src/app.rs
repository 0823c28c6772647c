//! Application state and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use docflow_api::AppState as ApiAppState;
use docflow_core::config::AppConfig;
use docflow_infra::{
    create_pool, run_migrations, AppMetrics, NatsConfig, NatsPublisher, NotificationProducer,
    PgDocumentStore,
};
use docflow_service::DocumentService;

use crate::cli::Args;
use crate::server::Server;

/// Main application
pub struct App {
    config: AppConfig,
    state: ApiAppState,
}

impl App {
    /// Build the application with all dependencies
    pub async fn build(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => AppConfig::load_from_file(&path.to_string_lossy())
                .context("Failed to load configuration file")?,
            None => AppConfig::load().context("Failed to load configuration")?,
        };

        if let Some(port) = args.port {
            config.server.port = port;
        }

        let state = build_state(&config).await?;

        Ok(Self { config, state })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        info!("Starting server");
        info!("HTTP port: {}", self.config.server.port);

        let server = Server::new(self.config.server.clone(), self.state);
        server.run().await?;

        Ok(())
    }
}

async fn build_state(config: &AppConfig) -> Result<ApiAppState> {
    info!("Initializing application components");

    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    let store = Arc::new(PgDocumentStore::new(pool));

    let metrics = Arc::new(AppMetrics::new());

    // retry_on_initial_connect keeps the API serving even while the
    // channel is unreachable; creates succeed and only the notification
    // is lost.
    let publisher = NatsPublisher::new(
        NatsConfig::new(&config.nats.url)
            .with_name("docflow-server")
            .with_retry_on_initial_connect(true),
    )
    .await
    .context("Failed to initialize message channel client")?;

    let producer = Arc::new(NotificationProducer::new(
        publisher,
        config.nats.topic.clone(),
        metrics.clone(),
    ));

    let service = Arc::new(DocumentService::new(store, producer, metrics.clone()));

    Ok(ApiAppState::new(service, metrics))
}
