use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub nats: NatsSettings,
    pub server: ServerConfig,
    pub consumer: ConsumerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_env("APP")
    }

    /// Load configuration from environment with custom prefix
    pub fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(
                Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("database.url", "postgres://localhost/documents")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("nats.url", "nats://127.0.0.1:4222")?
            .set_default("nats.topic", "documents")?
            .set_default("nats.queue_group", "document-enricher")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("consumer.startup_max_retries", 5)?
            .set_default("consumer.startup_retry_delay_secs", 5)?
            .set_default("consumer.poll_wait_secs", 1)?
            .set_default("consumer.poll_backoff_secs", 1)?
            .set_default("consumer.batch_size", 64)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from file with environment overrides
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("APP").separator("__"));

        let config = builder.build()?;
        config.try_deserialize()
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }

    pub fn with_pool_size(mut self, min: u32, max: u32) -> Self {
        self.min_connections = min;
        self.max_connections = max;
        self
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

/// Message channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsSettings {
    pub url: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_queue_group")]
    pub queue_group: String,
}

impl NatsSettings {
    pub fn new(url: String) -> Self {
        Self {
            url,
            topic: default_topic(),
            queue_group: default_queue_group(),
        }
    }

    pub fn with_topic(mut self, topic: String) -> Self {
        self.topic = topic;
        self
    }

    pub fn with_queue_group(mut self, queue_group: String) -> Self {
        self.queue_group = queue_group;
        self
    }
}

fn default_topic() -> String {
    "documents".to_string()
}

fn default_queue_group() -> String {
    "document-enricher".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Enrichment worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    #[serde(default = "default_startup_max_retries")]
    pub startup_max_retries: u32,
    #[serde(default = "default_startup_retry_delay_secs")]
    pub startup_retry_delay_secs: u64,
    #[serde(default = "default_poll_wait_secs")]
    pub poll_wait_secs: u64,
    #[serde(default = "default_poll_backoff_secs")]
    pub poll_backoff_secs: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl ConsumerConfig {
    pub fn poll_wait(&self) -> Duration {
        Duration::from_secs(self.poll_wait_secs)
    }

    pub fn poll_backoff(&self) -> Duration {
        Duration::from_secs(self.poll_backoff_secs)
    }

    pub fn startup_retry_delay(&self) -> Duration {
        Duration::from_secs(self.startup_retry_delay_secs)
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            startup_max_retries: default_startup_max_retries(),
            startup_retry_delay_secs: default_startup_retry_delay_secs(),
            poll_wait_secs: default_poll_wait_secs(),
            poll_backoff_secs: default_poll_backoff_secs(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_startup_max_retries() -> u32 {
    5
}

fn default_startup_retry_delay_secs() -> u64 {
    5
}

fn default_poll_wait_secs() -> u64 {
    1
}

fn default_poll_backoff_secs() -> u64 {
    1
}

fn default_batch_size() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = AppConfig::load_from_env("DOCFLOW_TEST_UNSET").unwrap();
        assert_eq!(config.database.url, "postgres://localhost/documents");
        assert_eq!(config.nats.url, "nats://127.0.0.1:4222");
        assert_eq!(config.nats.topic, "documents");
        assert_eq!(config.nats.queue_group, "document-enricher");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.consumer.startup_max_retries, 5);
        assert_eq!(config.consumer.startup_retry_delay_secs, 5);
        assert_eq!(config.consumer.poll_wait_secs, 1);
    }

    #[test]
    fn test_consumer_durations() {
        let consumer = ConsumerConfig::default();
        assert_eq!(consumer.poll_wait(), Duration::from_secs(1));
        assert_eq!(consumer.poll_backoff(), Duration::from_secs(1));
        assert_eq!(consumer.startup_retry_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_nats_settings_builder() {
        let nats = NatsSettings::new("nats://example:4222".to_string())
            .with_topic("docs".to_string())
            .with_queue_group("workers".to_string());
        assert_eq!(nats.topic, "docs");
        assert_eq!(nats.queue_group, "workers");
    }
}
