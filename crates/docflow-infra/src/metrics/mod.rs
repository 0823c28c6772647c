//! Application metrics
//!
//! Atomic counter/gauge/histogram primitives and the injected registry.
//! The registry is constructed once at process start and passed by
//! reference to each component; there is no ambient global.

pub mod primitives;
pub mod registry;

pub use primitives::{Counter, Gauge, Histogram, HistogramTimer};
pub use registry::{AppMetrics, HttpMetrics, PipelineMetrics};
