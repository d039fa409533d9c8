//! Ingester configuration.
//!
//! Loaded from a YAML file with `${VAR}` / `${VAR:-default}` substitution,
//! then overridden by environment variables and finally by CLI flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ingestion::{IngestOptions, UnitSelection};

/// Top-level ingester configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngesterConfig {
    /// Catalog schema name, e.g. `ucac4`.
    pub catalog: String,

    /// Directory holding the catalog's files.
    pub data_root: PathBuf,

    pub database: DatabaseConfig,

    pub ingest: IngestOptions,

    pub logging: LoggingConfig,

    /// Units to ingest when none are given on the command line.
    pub selection: Option<UnitSelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; unset means dry run into memory.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for IngesterConfig {
    fn default() -> Self {
        Self {
            catalog: "2mass".to_string(),
            data_root: PathBuf::from("/data/catalogs"),
            database: DatabaseConfig::default(),
            ingest: IngestOptions::default(),
            logging: LoggingConfig::default(),
            selection: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl IngesterConfig {
    /// Load from a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read ingester config from {:?}", path.as_ref()))?;

        let expanded = expand_env_vars(&content)?;

        let mut config: IngesterConfig =
            serde_yaml::from_str(&expanded).with_context(|| "Failed to parse ingester config YAML")?;

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// `DATABASE_URL`, `CATALOG_DATA_ROOT` and `LOG_LEVEL` win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database.url = Some(url);
            }
        }
        if let Ok(root) = env::var("CATALOG_DATA_ROOT") {
            if !root.is_empty() {
                self.data_root = PathBuf::from(root);
            }
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.is_empty() {
            anyhow::bail!("catalog must be set");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        self.ingest.validate()?;
        Ok(())
    }
}

/// Expand environment variables in config content.
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestion::WorkUnit;
    use std::io::Write;

    #[test]
    fn test_expand_env_vars_with_default() {
        let result = expand_env_vars("root: ${STAR_TEST_UNSET_VAR:-/srv/ucac4}").unwrap();
        assert_eq!(result, "root: /srv/ucac4");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        assert!(expand_env_vars("${STAR_TEST_REQUIRED_VAR}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_expand_env_vars_plain_text() {
        let text = "price: $5 and {braces}";
        assert_eq!(expand_env_vars(text).unwrap(), text);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
catalog: ucac4
data_root: ${{STAR_TEST_UNSET_ROOT:-/srv/ucac4}}
database:
  max_connections: 4
ingest:
  concurrency: 2
logging:
  format: json
selection:
  explicit:
    - kind: zone
      zone: 12
      ra_bins: {{ start: 100, end: 110 }}
"#
        )
        .unwrap();

        let config = IngesterConfig::load(file.path()).unwrap();
        assert_eq!(config.catalog, "ucac4");
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.ingest.concurrency, 2);
        assert_eq!(config.ingest.max_consecutive_sink_errors, 25);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.selection,
            Some(UnitSelection::Explicit(vec![WorkUnit::Zone {
                zone: 12,
                ra_bins: Some(100..=110)
            }]))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "catalog: ''").unwrap();
        assert!(IngesterConfig::load(file.path()).is_err());
    }
}
