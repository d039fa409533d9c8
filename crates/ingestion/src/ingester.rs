//! Batch orchestration: work units through decode, normalize, route and sink.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use catalog_common::{route, CatalogError};
use storage::{StarSink, UpsertOutcome};

use crate::config::IngestOptions;
use crate::decode::Decoder;
use crate::error::{IngestionError, Result};
use crate::reader::{Decoded, UnitReader};
use crate::schema::CatalogSchema;
use crate::units::{UnitSelection, WorkUnit};

/// Counts accumulated over one or more units.
///
/// `merge` is a field-wise sum, so results from parallel units can be
/// combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestionResult {
    /// Records stored by the sink.
    pub accepted: u64,
    /// Records whose catalog id was already stored.
    pub duplicate: u64,
    /// Records that could not be decoded, normalized or stored.
    pub failed: u64,
    /// Records outside a requested RA sub-range.
    pub skipped: u64,
    pub units_processed: u64,
    /// Units that could not be opened or were abandoned.
    pub units_failed: u64,
    /// Files of directory units that could not be read; the rest of the
    /// directory still counts toward `units_processed`.
    pub files_failed: u64,
}

impl IngestionResult {
    pub fn merge(self, other: Self) -> Self {
        Self {
            accepted: self.accepted + other.accepted,
            duplicate: self.duplicate + other.duplicate,
            failed: self.failed + other.failed,
            skipped: self.skipped + other.skipped,
            units_processed: self.units_processed + other.units_processed,
            units_failed: self.units_failed + other.units_failed,
            files_failed: self.files_failed + other.files_failed,
        }
    }

    /// Records read, whatever their outcome.
    pub fn records_seen(&self) -> u64 {
        self.accepted + self.duplicate + self.failed + self.skipped
    }

    fn unit_failed() -> Self {
        Self {
            units_failed: 1,
            ..Self::default()
        }
    }
}

/// Ingests one catalog into a sink.
pub struct Ingester {
    schema: Arc<CatalogSchema>,
    decoder: Arc<Decoder>,
    sink: Arc<dyn StarSink>,
    data_root: PathBuf,
    options: IngestOptions,
}

impl Ingester {
    /// Create an ingester for `schema`, reading units under `data_root`.
    pub fn new(
        schema: CatalogSchema,
        sink: Arc<dyn StarSink>,
        data_root: impl Into<PathBuf>,
        options: IngestOptions,
    ) -> Result<Self> {
        schema.validate()?;
        options.validate()?;
        let decoder = Decoder::for_schema(&schema)?;
        Ok(Self {
            schema: Arc::new(schema),
            decoder: Arc::new(decoder),
            sink,
            data_root: data_root.into(),
            options,
        })
    }

    pub fn schema(&self) -> &CatalogSchema {
        &self.schema
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Expand `selection` and ingest every unit.
    pub async fn ingest_selection(&self, selection: &UnitSelection) -> Result<IngestionResult> {
        let units = selection.expand(&self.schema.units, &self.data_root)?;
        if units.is_empty() {
            warn!(catalog = %self.schema.name, "Work selection matched no units");
        }
        Ok(self.ingest_units(units).await)
    }

    /// Ingest units in parallel, up to `concurrency` at a time.
    pub async fn ingest_units(&self, units: Vec<WorkUnit>) -> IngestionResult {
        let total = units.len();
        info!(
            catalog = %self.schema.name,
            sink = %self.sink.name(),
            units = total,
            concurrency = self.options.concurrency,
            "Starting ingestion"
        );

        let result = stream::iter(units)
            .map(|unit| async move { self.ingest_unit(&unit).await })
            .buffer_unordered(self.options.concurrency)
            .fold(IngestionResult::default(), |acc, r| async move { acc.merge(r) })
            .await;

        info!(
            catalog = %self.schema.name,
            accepted = result.accepted,
            duplicate = result.duplicate,
            failed = result.failed,
            skipped = result.skipped,
            units_processed = result.units_processed,
            units_failed = result.units_failed,
            files_failed = result.files_failed,
            "Ingestion complete"
        );
        result
    }

    /// Ingest one unit.
    ///
    /// Never fails: record problems are counted as `failed`, and a unit
    /// that cannot be opened or is abandoned after sink failures counts as
    /// `units_failed`. Records stored before abandonment stay stored.
    #[instrument(skip(self, unit), fields(catalog = %self.schema.name, unit = %unit))]
    pub async fn ingest_unit(&self, unit: &WorkUnit) -> IngestionResult {
        let paths = match unit.resolve(&self.data_root, &self.schema.units) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(error = %e, "Cannot address unit");
                return IngestionResult::unit_failed();
            }
        };

        let (tx, mut rx) = mpsc::channel(self.options.channel_capacity);
        let reader = UnitReader {
            schema: self.schema.clone(),
            decoder: self.decoder.clone(),
            tx,
        };
        let task_unit = unit.clone();
        let handle = tokio::task::spawn_blocking(move || reader.run(&task_unit, &paths));

        let mut result = IngestionResult::default();
        let mut consecutive_sink_errors = 0usize;
        let mut abandoned = false;

        while let Some(item) = rx.recv().await {
            match item {
                Decoded::Skipped => result.skipped += 1,
                Decoded::FileFailed { path, error } => {
                    result.files_failed += 1;
                    warn!(file = ?path, error = %error, "Skipping unreadable file");
                }
                Decoded::Failed { index, error } => {
                    result.failed += 1;
                    if self.options.log_record_failures {
                        debug!(record = index, error = %error, "Rejected record");
                    }
                }
                Decoded::Record(record) => {
                    let partition = route(&record);
                    match self.sink.upsert(partition, &record).await {
                        Ok(UpsertOutcome::Inserted) => {
                            result.accepted += 1;
                            consecutive_sink_errors = 0;
                        }
                        Ok(UpsertOutcome::Duplicate) => {
                            result.duplicate += 1;
                            consecutive_sink_errors = 0;
                        }
                        Err(e) if e.is_record_level() => {
                            result.failed += 1;
                            consecutive_sink_errors += 1;
                            if self.options.log_record_failures {
                                debug!(catalog_id = %record.catalog_id, error = %e, "Sink rejected record");
                            }
                            if consecutive_sink_errors >= self.options.max_consecutive_sink_errors {
                                warn!(
                                    errors = consecutive_sink_errors,
                                    "Too many consecutive sink errors, abandoning unit"
                                );
                                abandoned = true;
                                break;
                            }
                        }
                        Err(e) => {
                            result.failed += 1;
                            error!(error = %e, "Sink connection lost, abandoning unit");
                            abandoned = true;
                            break;
                        }
                    }
                }
            }
        }
        // stops the reader at its next send
        drop(rx);

        let read = handle
            .await
            .map_err(|e| IngestionError::Task(e.to_string()));
        match read {
            Ok(Ok(())) if !abandoned => {
                result.units_processed += 1;
                info!(
                    accepted = result.accepted,
                    duplicate = result.duplicate,
                    failed = result.failed,
                    skipped = result.skipped,
                    files_failed = result.files_failed,
                    "Unit complete"
                );
            }
            Ok(Ok(())) => result.units_failed += 1,
            Ok(Err(e)) => {
                result.units_failed += 1;
                match e {
                    CatalogError::UnitNotFound(_) => warn!(error = %e, "Unit not found"),
                    _ => warn!(error = %e, records = result.records_seen(), "Unit failed"),
                }
            }
            Err(e) => {
                result.units_failed += 1;
                error!(error = %e, "Unit reader crashed");
            }
        }
        result
    }

    /// Administrative reset of the sink's sessions.
    pub async fn reset_sink(&self) -> Result<()> {
        self.sink.reset().await?;
        Ok(())
    }
}
