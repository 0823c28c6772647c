//! Document service
//!
//! Orchestrates the store and the notification producer on the API side.

pub mod service;

pub use service::DocumentService;
