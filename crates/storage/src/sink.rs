//! The sink collaborator interface.

use async_trait::async_trait;

use catalog_common::{CatalogResult, Partition, StarRecord};

/// Result of one successful upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// A record with the same catalog id was already stored. Not an error.
    Duplicate,
}

/// Idempotent destination for normalized records.
///
/// Upserting the same catalog id twice must leave the stored record
/// unchanged and report [`UpsertOutcome::Duplicate`]. Connection-level
/// failures are reported as `CatalogError::SinkUnavailable`; a failure
/// confined to one record as `CatalogError::Sink`.
#[async_trait]
pub trait StarSink: Send + Sync {
    /// Store `record` in `partition` unless its catalog id is already present.
    async fn upsert(&self, partition: Partition, record: &StarRecord) -> CatalogResult<UpsertOutcome>;

    /// Administrative reset of the sink's server-side sessions.
    async fn reset(&self) -> CatalogResult<()>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
