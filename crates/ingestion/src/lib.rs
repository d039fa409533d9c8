//! Star catalog ingestion library.
//!
//! Drives catalog records through decode, normalize, coordinate
//! derivation and visibility routing into an idempotent sink.
//!
//! # Architecture
//!
//! This crate is used by the `ingester` service. It handles:
//!
//! - Declarative catalog schemas (2MASS, GSC 2.4, Hipparcos, SAO, UCAC4)
//! - Delimited, fixed-width and packed binary record decoding
//! - Sentinel resolution, field scaling and coordinate precedence
//! - Work-unit addressing (region grid, zones, files, directories)
//! - Parallel, failure-tolerant batch orchestration

pub mod catalogs;
pub mod config;
pub mod decode;
pub mod error;
mod ingester;
pub mod normalize;
mod reader;
pub mod schema;
pub mod units;

// Re-exports
pub use config::{load_schema, load_schema_from, IngestOptions};
pub use error::{IngestionError, Result};
pub use ingester::{Ingester, IngestionResult};
pub use normalize::build_record;
pub use schema::{CatalogSchema, FieldRole, FieldSource, FieldSpec, RecordFormat};
pub use units::{UnitLayout, UnitSelection, WorkUnit};
