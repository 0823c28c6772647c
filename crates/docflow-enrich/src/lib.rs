//! Pure text enrichment engine.
//!
//! Stateless and deterministic: no I/O, no failure modes. Input coercion
//! (unwrapping request bodies, message payloads, and so on) is the
//! caller's responsibility; by the time text reaches this crate it is a
//! plain `&str`.

pub mod summary;

pub use summary::{char_count, describe, word_count};
