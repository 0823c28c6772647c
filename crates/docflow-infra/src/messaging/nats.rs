use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, error, info};

use docflow_core::messaging::MessageSource;
use docflow_core::AppError;

use crate::{InfraError, Result};

#[derive(Debug, Clone)]
pub struct NatsConfig {
    pub url: String,
    pub name: Option<String>,
    pub reconnect_delay: Duration,
    /// When set, construction succeeds even while the server is
    /// unreachable and the client keeps retrying in the background. The
    /// API process uses this so document creation stays available when
    /// the channel is down; the worker wants a hard failure instead.
    pub retry_on_initial_connect: bool,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: String::from("nats://127.0.0.1:4222"),
            name: Some(String::from("docflow")),
            reconnect_delay: Duration::from_secs(2),
            retry_on_initial_connect: false,
        }
    }
}

impl NatsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_retry_on_initial_connect(mut self, retry: bool) -> Self {
        self.retry_on_initial_connect = retry;
        self
    }
}

#[derive(Clone)]
pub struct NatsPublisher {
    client: Client,
}

impl NatsPublisher {
    pub async fn new(config: NatsConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.url);

        let mut options = ConnectOptions::new().reconnect_delay_callback(move |attempts| {
            let delay = std::cmp::min(
                Duration::from_secs(2_u64.pow(attempts as u32)),
                Duration::from_secs(30),
            );
            debug!("NATS reconnect attempt {} with delay {:?}", attempts, delay);
            delay
        });

        if let Some(name) = &config.name {
            options = options.name(name);
        }

        if config.retry_on_initial_connect {
            options = options.retry_on_initial_connect();
        }

        let client = options.connect(&config.url).await.map_err(|e| {
            error!("Failed to connect to NATS: {}", e);
            InfraError::Messaging(format!("Failed to connect to NATS: {}", e))
        })?;

        info!("NATS connection established");

        Ok(Self { client })
    }

    pub async fn publish_raw(&self, subject: &str, payload: Vec<u8>) -> Result<()> {
        debug!("Publishing message to subject: {}", subject);

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| {
                error!("Failed to publish to {}: {}", subject, e);
                InfraError::Messaging(format!("Failed to publish to {}: {}", subject, e))
            })?;

        // Publishes are buffered client-side; flush so transport failures
        // surface to the caller instead of disappearing into the buffer.
        self.client.flush().await.map_err(|e| {
            error!("Failed to flush publish to {}: {}", subject, e);
            InfraError::Messaging(format!("Failed to flush publish to {}: {}", subject, e))
        })?;

        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing NATS health check");

        if self.client.connection_state() == async_nats::connection::State::Connected {
            Ok(())
        } else {
            Err(InfraError::Messaging(
                "NATS client is not connected".to_string(),
            ))
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub struct NatsSubscriber {
    subscriber: Subscriber,
    subject: String,
}

impl NatsSubscriber {
    pub async fn new(client: &Client, subject: impl Into<String>) -> Result<Self> {
        let subject = subject.into();
        info!("Subscribing to subject: {}", subject);

        let subscriber = client.subscribe(subject.clone()).await.map_err(|e| {
            error!("Failed to subscribe to {}: {}", subject, e);
            InfraError::Messaging(format!("Failed to subscribe to {}: {}", subject, e))
        })?;

        info!("Subscribed to subject: {}", subject);

        Ok(Self { subscriber, subject })
    }

    /// Queue-group subscription: workers in the same group share the
    /// subject, each message going to exactly one of them.
    pub async fn new_queue(
        client: &Client,
        subject: impl Into<String>,
        queue: impl Into<String>,
    ) -> Result<Self> {
        let subject = subject.into();
        let queue = queue.into();
        info!("Subscribing to subject: {} with queue: {}", subject, queue);

        let subscriber = client
            .queue_subscribe(subject.clone(), queue.clone())
            .await
            .map_err(|e| {
                error!("Failed to subscribe to {} (queue: {}): {}", subject, queue, e);
                InfraError::Messaging(format!(
                    "Failed to subscribe to {} (queue: {}): {}",
                    subject, queue, e
                ))
            })?;

        info!("Subscribed to subject: {} with queue: {}", subject, queue);

        Ok(Self { subscriber, subject })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub async fn unsubscribe(mut self) -> Result<()> {
        info!("Unsubscribing from subject: {}", self.subject);

        self.subscriber.unsubscribe().await.map_err(|e| {
            error!("Failed to unsubscribe from {}: {}", self.subject, e);
            InfraError::Messaging(format!("Failed to unsubscribe from {}: {}", self.subject, e))
        })?;

        Ok(())
    }
}

/// Bounded-wait batch fetch over a NATS subscription.
///
/// Waits up to the given duration for a first message, then drains
/// whatever is already buffered, up to the batch limit.
pub struct NatsMessageSource {
    subscriber: NatsSubscriber,
}

impl NatsMessageSource {
    pub fn new(subscriber: NatsSubscriber) -> Self {
        Self { subscriber }
    }

    pub async fn close(self) -> Result<()> {
        self.subscriber.unsubscribe().await
    }
}

const DRAIN_WAIT: Duration = Duration::from_millis(10);

#[async_trait]
impl MessageSource for NatsMessageSource {
    async fn recv_batch(
        &mut self,
        wait: Duration,
        max: usize,
    ) -> docflow_core::Result<Vec<Vec<u8>>> {
        let mut batch = Vec::new();

        match tokio::time::timeout(wait, self.subscriber.subscriber.next()).await {
            // Wait elapsed with nothing available.
            Err(_) => return Ok(batch),
            Ok(None) => {
                return Err(AppError::transport(format!(
                    "subscription to {} closed",
                    self.subscriber.subject
                )))
            }
            Ok(Some(message)) => batch.push(message.payload.to_vec()),
        }

        while batch.len() < max {
            match tokio::time::timeout(DRAIN_WAIT, self.subscriber.subscriber.next()).await {
                Ok(Some(message)) => batch.push(message.payload.to_vec()),
                Ok(None) | Err(_) => break,
            }
        }

        debug!("Fetched batch of {} messages", batch.len());
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = NatsConfig::new("nats://localhost:4222")
            .with_name("test-client")
            .with_reconnect_delay(Duration::from_secs(1))
            .with_retry_on_initial_connect(true);

        assert_eq!(config.url, "nats://localhost:4222");
        assert_eq!(config.name, Some("test-client".to_string()));
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert!(config.retry_on_initial_connect);
    }

    #[test]
    fn test_config_defaults() {
        let config = NatsConfig::default();
        assert_eq!(config.url, "nats://127.0.0.1:4222");
        assert!(!config.retry_on_initial_connect);
    }
}
