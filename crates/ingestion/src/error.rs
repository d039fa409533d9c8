//! Error types for the ingestion crate.

use thiserror::Error;

use catalog_common::CatalogError;

/// Errors that can occur while configuring or driving ingestion.
///
/// Record-level and unit-level failures are tallied in an
/// [`IngestionResult`](crate::IngestionResult) rather than returned.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse catalog schema: {0}")]
    SchemaParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Decode task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
