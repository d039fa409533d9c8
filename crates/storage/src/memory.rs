//! In-memory sink.
//!
//! Backs dry runs and tests. Records are keyed by partition and catalog id;
//! the first record stored for a key wins.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use catalog_common::{CatalogError, CatalogId, CatalogResult, Partition, StarRecord};

use crate::sink::{StarSink, UpsertOutcome};

/// Counters for the memory sink.
#[derive(Debug, Default)]
pub struct MemorySinkStats {
    pub inserted: AtomicU64,
    pub duplicates: AtomicU64,
    pub resets: AtomicU64,
}

/// Thread-safe in-memory [`StarSink`].
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<RwLock<HashMap<(Partition, CatalogId), StarRecord>>>,
    unavailable: Arc<AtomicBool>,
    stats: Arc<MemorySinkStats>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a lost connection: every upsert fails with
    /// `SinkUnavailable` until made available again.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub async fn get(&self, partition: Partition, id: &CatalogId) -> Option<StarRecord> {
        self.records
            .read()
            .await
            .get(&(partition, id.clone()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Records in one partition, ordered by catalog id.
    pub async fn records(&self, partition: Partition) -> Vec<StarRecord> {
        let guard = self.records.read().await;
        let mut out: Vec<StarRecord> = guard
            .iter()
            .filter(|((p, _), _)| *p == partition)
            .map(|(_, r)| r.clone())
            .collect();
        out.sort_by(|a, b| a.catalog_id.cmp(&b.catalog_id));
        out
    }

    pub fn stats(&self) -> &MemorySinkStats {
        &self.stats
    }
}

#[async_trait]
impl StarSink for MemorySink {
    async fn upsert(&self, partition: Partition, record: &StarRecord) -> CatalogResult<UpsertOutcome> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::SinkUnavailable(
                "memory sink marked unavailable".to_string(),
            ));
        }

        let mut guard = self.records.write().await;
        let key = (partition, record.catalog_id.clone());
        if guard.contains_key(&key) {
            self.stats.duplicates.fetch_add(1, Ordering::Relaxed);
            return Ok(UpsertOutcome::Duplicate);
        }
        guard.insert(key, record.clone());
        self.stats.inserted.fetch_add(1, Ordering::Relaxed);
        Ok(UpsertOutcome::Inserted)
    }

    async fn reset(&self) -> CatalogResult<()> {
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        debug!("Memory sink reset (no sessions to terminate)");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
