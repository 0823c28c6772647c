//! Retry policies
//!
//! Bounded retry with fixed or exponential delay. The enrichment worker
//! uses the fixed strategy while acquiring its channel subscription and
//! store connection at startup; once the retry budget is exhausted the
//! error propagates and the process exits.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 means try once, no retry)
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Retry policy implementation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with fixed delay (no exponential backoff)
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(RetryConfig {
            max_attempts,
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
        })
    }

    /// Create with exponential backoff
    pub fn exponential(max_attempts: u32) -> Self {
        Self::new(RetryConfig {
            max_attempts,
            ..Default::default()
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Calculate the delay before a given retry (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = self
            .config
            .initial_delay
            .mul_f64(self.config.multiplier.powi((attempt - 1) as i32));

        base_delay.min(self.config.max_delay)
    }

    /// Run an operation, retrying on error until the attempt budget is
    /// exhausted; the final error is returned unchanged.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, self.config.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
