//! Error types shared by the catalog ingestion crates.

use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Primary error type for decode, normalize and sink operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    // === Record Errors ===
    #[error("Malformed coordinate: {0}")]
    MalformedCoordinate(String),

    #[error("Failed to parse field '{field}': {reason}")]
    FieldParse { field: String, reason: String },

    #[error("Truncated record: expected {expected} bytes/fields, got {actual}")]
    TruncatedRecord { expected: usize, actual: usize },

    // === Zone Index Errors ===
    #[error("Zone index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Invalid RA bin: {0} (expected 0..360)")]
    InvalidBin(i64),

    // === Sink Errors ===
    #[error("Sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Sink rejected record: {0}")]
    Sink(String),

    // === Unit / Schema Errors ===
    #[error("Work unit not found: {0}")]
    UnitNotFound(String),

    #[error("Invalid catalog schema: {0}")]
    InvalidSchema(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Shorthand for a field parse failure.
    pub fn field_parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::FieldParse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is confined to one record.
    ///
    /// Record-level errors are tallied as failed records; anything else
    /// concerns the unit of work or the sink connection.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            CatalogError::MalformedCoordinate(_)
                | CatalogError::FieldParse { .. }
                | CatalogError::TruncatedRecord { .. }
                | CatalogError::Sink(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_level_classification() {
        assert!(CatalogError::MalformedCoordinate("x".into()).is_record_level());
        assert!(CatalogError::field_parse("j_m", "not a float").is_record_level());
        assert!(CatalogError::TruncatedRecord {
            expected: 78,
            actual: 12
        }
        .is_record_level());
        assert!(!CatalogError::SinkUnavailable("gone".into()).is_record_level());
        assert!(!CatalogError::UnitNotFound("z001".into()).is_record_level());
        assert!(!CatalogError::IndexUnavailable("short".into()).is_record_level());
    }

    #[test]
    fn test_display_messages() {
        let err = CatalogError::field_parse("h_m", "invalid float literal");
        assert_eq!(
            err.to_string(),
            "Failed to parse field 'h_m': invalid float literal"
        );
        assert_eq!(
            CatalogError::InvalidBin(360).to_string(),
            "Invalid RA bin: 360 (expected 0..360)"
        );
    }
}
