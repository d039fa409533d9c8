//! Storage for normalized star records.
//!
//! Provides:
//! - The `StarSink` upsert interface used by the ingestion pipeline
//! - An in-memory sink for dry runs and tests
//! - PostgreSQL star tables

pub mod catalog;
pub mod memory;
pub mod sink;

pub use catalog::StarCatalog;
pub use memory::{MemorySink, MemorySinkStats};
pub use sink::{StarSink, UpsertOutcome};
