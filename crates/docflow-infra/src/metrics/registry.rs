//! The injected metrics registry and its Prometheus text exposition.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::metrics::primitives::{Counter, Gauge, Histogram};

const LATENCY_BUCKETS: [f64; 5] = [0.1, 0.5, 1.0, 2.0, 5.0];
const SIZE_BUCKETS: [f64; 5] = [100.0, 500.0, 1000.0, 5000.0, 10000.0];

/// HTTP request metrics
pub struct HttpMetrics {
    /// Total requests by method/endpoint/status
    requests_total: RwLock<HashMap<(String, String, u16), Counter>>,
    /// Request duration histogram
    pub request_duration: Histogram,
    /// Requests currently in flight
    pub requests_in_progress: Gauge,
    /// Document content size observed on create
    pub document_size: Histogram,
}

impl HttpMetrics {
    fn new() -> Self {
        Self {
            requests_total: RwLock::new(HashMap::new()),
            request_duration: Histogram::new(LATENCY_BUCKETS.to_vec()),
            requests_in_progress: Gauge::new(),
            document_size: Histogram::new(SIZE_BUCKETS.to_vec()),
        }
    }

    /// Record a completed request
    pub async fn record_request(&self, method: &str, endpoint: &str, status: u16, duration: Duration) {
        {
            let mut requests = self.requests_total.write().await;
            requests
                .entry((method.to_string(), endpoint.to_string(), status))
                .or_insert_with(Counter::new)
                .inc();
        }

        self.request_duration.observe(duration.as_secs_f64());
    }

    /// Current count for a method/endpoint/status combination
    pub async fn request_count(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        let requests = self.requests_total.read().await;
        requests
            .get(&(method.to_string(), endpoint.to_string(), status))
            .map(Counter::get)
            .unwrap_or(0)
    }
}

/// Enrichment pipeline metrics, shared by producer and consumer
pub struct PipelineMetrics {
    /// Documents accepted by the service
    pub documents_processed: Counter,
    /// Notifications delivered to the channel
    pub messages_sent: Counter,
    /// Notifications the channel refused
    pub messages_failed: Counter,
    /// Messages enriched successfully
    pub processing_success: Counter,
    /// Messages dropped: undecodable, missing fields, unknown document,
    /// or a store failure mid-enrichment
    pub processing_failed: Counter,
    /// Time spent handling one message
    pub processing_time: Histogram,
}

impl PipelineMetrics {
    fn new() -> Self {
        Self {
            documents_processed: Counter::new(),
            messages_sent: Counter::new(),
            messages_failed: Counter::new(),
            processing_success: Counter::new(),
            processing_failed: Counter::new(),
            processing_time: Histogram::new(LATENCY_BUCKETS.to_vec()),
        }
    }
}

/// Process-wide metrics registry.
///
/// Constructed once at startup and handed to components as
/// `Arc<AppMetrics>`.
pub struct AppMetrics {
    pub http: HttpMetrics,
    pub pipeline: PipelineMetrics,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self {
            http: HttpMetrics::new(),
            pipeline: PipelineMetrics::new(),
        }
    }

    /// Render every metric in Prometheus text exposition format.
    pub async fn render(&self) -> String {
        let mut out = String::new();

        writeln!(out, "# TYPE api_requests_total counter").ok();
        {
            let requests = self.http.requests_total.read().await;
            let mut keys: Vec<_> = requests.keys().collect();
            keys.sort();
            for key in keys {
                let (method, endpoint, status) = key;
                writeln!(
                    out,
                    "api_requests_total{{method=\"{}\",endpoint=\"{}\",status=\"{}\"}} {}",
                    method,
                    endpoint,
                    status,
                    requests[key].get()
                )
                .ok();
            }
        }

        writeln!(out, "# TYPE api_requests_in_progress gauge").ok();
        writeln!(
            out,
            "api_requests_in_progress {}",
            self.http.requests_in_progress.get()
        )
        .ok();

        render_histogram(
            &mut out,
            "api_request_duration_seconds",
            &self.http.request_duration,
        );
        render_histogram(&mut out, "document_size_bytes", &self.http.document_size);
        render_histogram(
            &mut out,
            "document_processing_seconds",
            &self.pipeline.processing_time,
        );

        render_counter(
            &mut out,
            "documents_processed_total",
            &self.pipeline.documents_processed,
        );
        render_counter(&mut out, "messages_sent_total", &self.pipeline.messages_sent);
        render_counter(
            &mut out,
            "messages_failed_total",
            &self.pipeline.messages_failed,
        );
        render_counter(
            &mut out,
            "document_processing_success_total",
            &self.pipeline.processing_success,
        );
        render_counter(
            &mut out,
            "document_processing_failed_total",
            &self.pipeline.processing_failed,
        );

        out
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn render_counter(out: &mut String, name: &str, counter: &Counter) {
    writeln!(out, "# TYPE {} counter", name).ok();
    writeln!(out, "{} {}", name, counter.get()).ok();
}

fn render_histogram(out: &mut String, name: &str, histogram: &Histogram) {
    writeln!(out, "# TYPE {} histogram", name).ok();
    for (le, count) in histogram.cumulative_buckets() {
        writeln!(out, "{}_bucket{{le=\"{}\"}} {}", name, le, count).ok();
    }
    writeln!(
        out,
        "{}_bucket{{le=\"+Inf\"}} {}",
        name,
        histogram.get_count()
    )
    .ok();
    writeln!(out, "{}_sum {}", name, histogram.get_sum()).ok();
    writeln!(out, "{}_count {}", name, histogram.get_count()).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_request_by_labels() {
        let metrics = AppMetrics::new();
        metrics
            .http
            .record_request("POST", "/api/v1/documents", 201, Duration::from_millis(50))
            .await;
        metrics
            .http
            .record_request("POST", "/api/v1/documents", 201, Duration::from_millis(70))
            .await;
        metrics
            .http
            .record_request("GET", "/api/v1/documents", 200, Duration::from_millis(10))
            .await;

        assert_eq!(
            metrics
                .http
                .request_count("POST", "/api/v1/documents", 201)
                .await,
            2
        );
        assert_eq!(
            metrics
                .http
                .request_count("GET", "/api/v1/documents", 200)
                .await,
            1
        );
        assert_eq!(
            metrics
                .http
                .request_count("DELETE", "/api/v1/documents", 204)
                .await,
            0
        );
        assert_eq!(metrics.http.request_duration.get_count(), 3);
    }

    #[tokio::test]
    async fn test_render_exposition() {
        let metrics = AppMetrics::new();
        metrics.pipeline.processing_success.inc();
        metrics.pipeline.processing_failed.inc_by(2);
        metrics
            .http
            .record_request("GET", "/health", 200, Duration::from_millis(1))
            .await;

        let text = metrics.render().await;
        assert!(text.contains("document_processing_success_total 1"));
        assert!(text.contains("document_processing_failed_total 2"));
        assert!(text.contains(
            "api_requests_total{method=\"GET\",endpoint=\"/health\",status=\"200\"} 1"
        ));
        assert!(text.contains("# TYPE api_request_duration_seconds histogram"));
        assert!(text.contains("api_request_duration_seconds_bucket{le=\"+Inf\"} 1"));
    }
}
