//! Enrichment worker
//!
//! Subscribes to the document channel, looks up each referenced document,
//! and persists its derived summary. Best-effort, at-least-once: failures
//! are counted and dropped after one attempt, and duplicate deliveries
//! are idempotent because the summary is a pure function of the message
//! content.

pub mod worker;

pub use worker::{EnrichmentWorker, WorkerConfig, WorkerState};
