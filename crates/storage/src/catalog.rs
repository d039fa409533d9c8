//! Star tables in PostgreSQL.
//!
//! Each catalog owns two tables, `<catalog>` and `<catalog>_not_visible`,
//! keyed by `catalog_id`. The tables are created outside this crate; the
//! expected columns are:
//!
//! ```sql
//! catalog_id TEXT PRIMARY KEY,
//! ra TEXT, decl TEXT,
//! ra_deg DOUBLE PRECISION, decl_deg DOUBLE PRECISION,
//! ra_rad DOUBLE PRECISION, decl_rad DOUBLE PRECISION,
//! photometry JSONB, proper_motion JSONB, extras JSONB
//! ```

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use catalog_common::{CatalogError, CatalogResult, Partition, StarRecord};

use crate::sink::{StarSink, UpsertOutcome};

/// PostgreSQL-backed [`StarSink`] for one catalog.
pub struct StarCatalog {
    pool: PgPool,
    catalog: String,
}

/// Reject anything but ASCII letters, digits and underscores.
///
/// Table names cannot be bound as parameters, so they are checked and then
/// quoted (catalog names such as `2mass` start with a digit).
fn quoted_table(catalog: &str, partition: Partition) -> CatalogResult<String> {
    if catalog.is_empty() || !catalog.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CatalogError::InvalidSchema(format!(
            "catalog name '{}' is not a valid table name",
            catalog
        )));
    }
    Ok(format!("\"{}{}\"", catalog, partition.table_suffix()))
}

/// Map a sqlx error to the sink taxonomy.
fn classify(err: sqlx::Error) -> CatalogError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => CatalogError::SinkUnavailable(err.to_string()),
        sqlx::Error::Database(db) => CatalogError::Sink(db.message().to_string()),
        other => CatalogError::Sink(other.to_string()),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(field: &str, value: &T) -> CatalogResult<String> {
    serde_json::to_string(value).map_err(|e| CatalogError::Sink(format!("{}: {}", field, e)))
}

impl StarCatalog {
    /// Connect to the database holding `catalog`'s tables.
    pub async fn connect(database_url: &str, catalog: &str, max_connections: u32) -> CatalogResult<Self> {
        quoted_table(catalog, Partition::Primary)?;

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| CatalogError::SinkUnavailable(format!("Connection failed: {}", e)))?;

        info!(catalog = %catalog, max_connections, "Connected to star catalog database");
        Ok(Self {
            pool,
            catalog: catalog.to_string(),
        })
    }

    fn insert_sql(&self, partition: Partition) -> CatalogResult<String> {
        let table = quoted_table(&self.catalog, partition)?;
        Ok(format!(
            r#"
            INSERT INTO {} (
                catalog_id, ra, decl,
                ra_deg, decl_deg, ra_rad, decl_rad,
                photometry, proper_motion, extras
            ) VALUES (
                $1, $2, $3,
                $4, $5, $6, $7,
                $8::jsonb, $9::jsonb, $10::jsonb
            )
            ON CONFLICT (catalog_id) DO NOTHING
            "#,
            table
        ))
    }
}

#[async_trait]
impl StarSink for StarCatalog {
    async fn upsert(&self, partition: Partition, record: &StarRecord) -> CatalogResult<UpsertOutcome> {
        let sql = self.insert_sql(partition)?;
        let photometry = to_json("photometry", &record.photometry)?;
        let proper_motion = record
            .proper_motion
            .as_ref()
            .map(|pm| to_json("proper_motion", pm))
            .transpose()?;
        let extras = to_json("extras", &record.extras)?;

        let result = sqlx::query(&sql)
            .bind(record.catalog_id.to_string())
            .bind(&record.ra_sexagesimal)
            .bind(&record.dec_sexagesimal)
            .bind(record.ra_deg)
            .bind(record.dec_deg)
            .bind(record.ra_rad)
            .bind(record.dec_rad)
            .bind(photometry)
            .bind(proper_motion)
            .bind(extras)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            Ok(UpsertOutcome::Duplicate)
        } else {
            Ok(UpsertOutcome::Inserted)
        }
    }

    async fn reset(&self) -> CatalogResult<()> {
        let terminated: Vec<(bool,)> = sqlx::query_as(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
             WHERE usename = current_user AND pid <> pg_backend_pid()",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        let count = terminated.iter().filter(|(ok,)| *ok).count();
        if count < terminated.len() {
            warn!(
                requested = terminated.len(),
                terminated = count,
                "Some sessions could not be terminated"
            );
        }
        info!(terminated = count, "Reset database sessions");
        Ok(())
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
