//! Ingestion options and catalog schema loading.
//!
//! A catalog schema named `X` is read from `$CONFIG_DIR/catalogs/X.yaml`
//! (default `config/catalogs/X.yaml`) when that file exists, otherwise the
//! built-in schema of the same name is used.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::catalogs;
use crate::error::{IngestionError, Result};
use crate::schema::CatalogSchema;

/// Tuning for one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Units processed in parallel.
    pub concurrency: usize,
    /// Consecutive failed upserts after which a unit is abandoned.
    pub max_consecutive_sink_errors: usize,
    /// Log each rejected record at debug level.
    pub log_record_failures: bool,
    /// Decoded records buffered between a unit's reader and its sink writer.
    pub channel_capacity: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_consecutive_sink_errors: 25,
            log_record_failures: true,
            channel_capacity: 1024,
        }
    }
}

impl IngestOptions {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(IngestionError::InvalidConfig("concurrency must be at least 1".into()));
        }
        if self.max_consecutive_sink_errors == 0 {
            return Err(IngestionError::InvalidConfig(
                "max_consecutive_sink_errors must be at least 1".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(IngestionError::InvalidConfig("channel_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

/// Directory holding catalog schema overrides.
///
/// Checks the CONFIG_DIR environment variable first, falls back to "config".
pub fn catalogs_dir() -> PathBuf {
    if let Ok(config_dir) = env::var("CONFIG_DIR") {
        PathBuf::from(config_dir).join("catalogs")
    } else {
        PathBuf::from("config/catalogs")
    }
}

/// Load and validate the schema for `name` using [`catalogs_dir`].
pub fn load_schema(name: &str) -> Result<CatalogSchema> {
    load_schema_from(&catalogs_dir(), name)
}

/// Load and validate the schema for `name`, preferring `dir/<name>.yaml`.
pub fn load_schema_from(dir: &Path, name: &str) -> Result<CatalogSchema> {
    let path = dir.join(format!("{}.yaml", name));

    let schema = if path.exists() {
        let content = fs::read_to_string(&path).map_err(|e| {
            error!(path = ?path, error = %e, "Failed to read catalog schema");
            e
        })?;
        let schema: CatalogSchema = serde_yaml::from_str(&content).map_err(|e| {
            error!(path = ?path, error = %e, "Failed to parse catalog schema");
            e
        })?;
        if schema.name != name {
            return Err(IngestionError::InvalidConfig(format!(
                "{} declares catalog '{}', expected '{}'",
                path.display(),
                schema.name,
                name
            )));
        }
        info!(catalog = %name, path = ?path, fields = schema.fields.len(), "Loaded catalog schema");
        schema
    } else {
        debug!(catalog = %name, path = ?path, "No schema override, using built-in");
        catalogs::builtin(name).ok_or_else(|| {
            IngestionError::InvalidConfig(format!(
                "unknown catalog '{}' (built-in: {})",
                name,
                catalogs::BUILTIN.join(", ")
            ))
        })?
    };

    schema.validate()?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::CatalogError;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_schema(dir: &TempDir, name: &str, content: &str) {
        let mut file = fs::File::create(dir.path().join(format!("{}.yaml", name))).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_builtin_when_no_override() {
        let dir = TempDir::new().unwrap();
        let schema = load_schema_from(dir.path(), "2mass").unwrap();
        assert_eq!(schema, catalogs::two_mass());
    }

    #[test]
    fn test_unknown_catalog() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_schema_from(dir.path(), "tycho2"),
            Err(IngestionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_override_file() {
        let dir = TempDir::new().unwrap();
        write_schema(
            &dir,
            "2mass",
            r#"
name: 2mass
format: { kind: delimited, delimiter: "|" }
units: { kind: regions, extension: psv }
fields:
  - { name: ra, source: { position: 0 }, kind: float, role: ra_deg }
  - { name: dec, source: { position: 1 }, kind: float, role: dec_deg }
  - { name: designation, source: { position: 2 }, kind: text, role: catalog_id }
"#,
        );
        let schema = load_schema_from(dir.path(), "2mass").unwrap();
        assert_eq!(schema.fields.len(), 3);
        assert!(matches!(
            schema.format,
            crate::schema::RecordFormat::Delimited { delimiter: '|', .. }
        ));
    }

    #[test]
    fn test_override_is_validated() {
        let dir = TempDir::new().unwrap();
        write_schema(
            &dir,
            "broken",
            r#"
name: broken
format: { kind: fixed_width }
units: { kind: single_file, file_name: broken.dat }
fields:
  - { name: id, source: { position: 0 }, kind: int, role: catalog_id }
"#,
        );
        assert!(matches!(
            load_schema_from(dir.path(), "broken"),
            Err(IngestionError::Catalog(CatalogError::InvalidSchema(_)))
        ));
    }

    #[test]
    fn test_override_name_mismatch() {
        let dir = TempDir::new().unwrap();
        write_schema(
            &dir,
            "ucac4",
            "name: other\nformat: { kind: fixed_width }\nunits: { kind: zones }\nfields: []\n",
        );
        assert!(matches!(
            load_schema_from(dir.path(), "ucac4"),
            Err(IngestionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_yaml() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir, "hipparcos", "name: [unclosed");
        assert!(matches!(
            load_schema_from(dir.path(), "hipparcos"),
            Err(IngestionError::SchemaParse(_))
        ));
    }

    #[test]
    fn test_options_defaults_and_partial_yaml() {
        let opts: IngestOptions = serde_yaml::from_str("concurrency: 8").unwrap();
        assert_eq!(opts.concurrency, 8);
        assert_eq!(opts.max_consecutive_sink_errors, 25);
        assert!(opts.log_record_failures);
        opts.validate().unwrap();

        let zero = IngestOptions {
            concurrency: 0,
            ..IngestOptions::default()
        };
        assert!(zero.validate().is_err());
    }
}
