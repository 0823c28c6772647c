//! Metric primitives
//!
//! Lock-free counters, gauges, and histograms suitable for sharing across
//! request handlers and the worker loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counter metric
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the counter by a value
    pub fn inc_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge metric
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gauge value
    pub fn set(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Increment the gauge by 1
    pub fn inc(&self) {
        self.add(1.0);
    }

    /// Decrement the gauge by 1
    pub fn dec(&self) {
        self.add(-1.0);
    }

    /// Add a delta to the gauge
    pub fn add(&self, delta: f64) {
        loop {
            let current = self.value.load(Ordering::Relaxed);
            let new_value = (f64::from_bits(current) + delta).to_bits();
            if self
                .value
                .compare_exchange(current, new_value, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }
    }

    /// Get the current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }
}

/// Histogram metric
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<f64>,
    bucket_counts: Vec<AtomicU64>,
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    /// Create a new histogram with the given buckets
    pub fn new(buckets: Vec<f64>) -> Self {
        let bucket_counts = (0..buckets.len() + 1).map(|_| AtomicU64::new(0)).collect();

        Self {
            buckets,
            bucket_counts,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Observe a value
    pub fn observe(&self, value: f64) {
        // Find the bucket
        let mut idx = self.buckets.len();
        for (i, &bucket) in self.buckets.iter().enumerate() {
            if value <= bucket {
                idx = i;
                break;
            }
        }

        // Increment bucket count
        self.bucket_counts[idx].fetch_add(1, Ordering::Relaxed);

        // Update sum
        loop {
            let current = self.sum.load(Ordering::Relaxed);
            let current_f64 = f64::from_bits(current);
            let new_value = (current_f64 + value).to_bits();
            if self
                .sum
                .compare_exchange(current, new_value, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }

        // Increment count
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Start a timer that observes when dropped
    pub fn start_timer(&self) -> HistogramTimer<'_> {
        HistogramTimer {
            histogram: self,
            start: Instant::now(),
        }
    }

    /// Get the count
    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get the sum
    pub fn get_sum(&self) -> f64 {
        f64::from_bits(self.sum.load(Ordering::Relaxed))
    }

    /// Get cumulative bucket counts, suitable for text exposition
    pub fn cumulative_buckets(&self) -> Vec<(f64, u64)> {
        let mut total = 0;
        self.buckets
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                total += self.bucket_counts[i].load(Ordering::Relaxed);
                (b, total)
            })
            .collect()
    }
}

/// Timer for histogram observations
pub struct HistogramTimer<'a> {
    histogram: &'a Histogram,
    start: Instant,
}

impl<'a> Drop for HistogramTimer<'a> {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);
        counter.inc();
        counter.inc();
        assert_eq!(counter.get(), 2);
        counter.inc_by(3);
        assert_eq!(counter.get(), 5);
    }

    #[test]
    fn test_gauge() {
        let gauge = Gauge::new();
        gauge.set(2.5);
        assert_eq!(gauge.get(), 2.5);
        gauge.inc();
        assert_eq!(gauge.get(), 3.5);
        gauge.dec();
        assert_eq!(gauge.get(), 2.5);
    }

    #[test]
    fn test_gauge_concurrent_updates_are_not_lost() {
        use std::sync::Arc;

        let gauge = Arc::new(Gauge::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gauge = gauge.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        gauge.inc();
                    }
                    for _ in 0..500 {
                        gauge.dec();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(gauge.get(), 8.0 * 500.0);
    }

    #[test]
    fn test_histogram_buckets() {
        let hist = Histogram::new(vec![0.1, 0.5, 1.0]);
        hist.observe(0.05);
        hist.observe(0.3);
        hist.observe(2.0);

        assert_eq!(hist.get_count(), 3);
        assert!((hist.get_sum() - 2.35).abs() < 1e-9);

        let buckets = hist.cumulative_buckets();
        assert_eq!(buckets, vec![(0.1, 1), (0.5, 2), (1.0, 2)]);
    }

    #[test]
    fn test_histogram_timer_records_on_drop() {
        let hist = Histogram::new(vec![1.0]);
        {
            let _timer = hist.start_timer();
        }
        assert_eq!(hist.get_count(), 1);
    }
}
