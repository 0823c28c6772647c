//! Document store implementations
//!
//! Postgres for production, an in-memory store for development and tests.

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use pool::{create_pool, run_migrations};
pub use postgres::PgDocumentStore;
