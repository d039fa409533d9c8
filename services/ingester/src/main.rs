//! Star catalog ingester.
//!
//! Reads a catalog's files (2MASS regions, UCAC4 zones, GSC, Hipparcos,
//! SAO, Gaia), normalizes every star and upserts it into the visible or
//! not-visible table of its catalog.

mod config;
mod selection;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{IngesterConfig, LogFormat};
use ingestion::{load_schema, Ingester, IngestionResult, UnitSelection};
use storage::{MemorySink, StarCatalog, StarSink};

#[derive(Parser, Debug)]
#[command(name = "ingester")]
#[command(about = "Star catalog ingester")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "INGESTER_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog to ingest (2mass, gaia, gsc240, hipparcos, sao2000, ucac4)
    #[arg(long)]
    catalog: Option<String>,

    /// Directory holding the catalog's files
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// PostgreSQL URL
    #[arg(long)]
    database_url: Option<String>,

    /// Unit to ingest, repeatable: zone:N[:first-last], region:D/S/R, file:PATH, dir:PATH
    #[arg(short, long = "unit")]
    units: Vec<String>,

    /// Contiguous dec bands or zones, start,end (end exclusive)
    #[arg(long, conflicts_with_all = ["units", "random", "all"])]
    range: Option<String>,

    /// Random sample of N units
    #[arg(long, conflicts_with_all = ["units", "all"])]
    random: Option<usize>,

    /// Seed for --random (default: current time)
    #[arg(long, requires = "random")]
    seed: Option<u64>,

    /// Every unit of the catalog
    #[arg(long, conflicts_with = "units")]
    all: bool,

    /// Restrict zone units to RA bins first-last
    #[arg(long)]
    ra_bins: Option<String>,

    /// Units processed in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Store into memory instead of the database
    #[arg(long)]
    dry_run: bool,

    /// Reset sink sessions before ingesting
    #[arg(long)]
    reset: bool,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Log format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

/// Printed on stdout when a run finishes.
#[derive(Debug, Serialize)]
struct RunSummary {
    catalog: String,
    sink: String,
    started_at: DateTime<Utc>,
    elapsed_secs: f64,
    units: usize,
    #[serde(flatten)]
    result: IngestionResult,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => IngesterConfig::load(path)?,
        None => IngesterConfig::from_env()?,
    };
    apply_args(&mut config, &args);
    config.validate()?;

    init_tracing(&config.logging.level, config.logging.format)?;

    info!(catalog = %config.catalog, data_root = ?config.data_root, "Starting star catalog ingester");

    let schema = load_schema(&config.catalog)?;

    let sink: Arc<dyn StarSink> = match (&config.database.url, args.dry_run) {
        (Some(url), false) => Arc::new(
            StarCatalog::connect(url, &config.catalog, config.database.max_connections)
                .await
                .context("Failed to connect to star catalog database")?,
        ),
        (None, false) => bail!("no database URL configured; set DATABASE_URL or pass --dry-run"),
        (_, true) => {
            info!("Dry run, records are kept in memory");
            Arc::new(MemorySink::new())
        }
    };

    let ingester = Ingester::new(schema, sink.clone(), config.data_root.clone(), config.ingest.clone())?;

    if args.reset {
        info!(sink = %sink.name(), "Resetting sink sessions");
        ingester.reset_sink().await?;
    }

    let selection = selection_from(&args, &config)?;
    let ra_bins = args.ra_bins.as_deref().map(selection::parse_bins).transpose()?;
    let mut units = selection.expand(&ingester.schema().units, ingester.data_root())?;
    if let Some(bins) = &ra_bins {
        units = selection::with_ra_bins(units, bins);
    }
    if units.is_empty() {
        warn!(selection = ?selection, "Selection matched no units");
    }

    let started_at = Utc::now();
    let clock = Instant::now();
    let unit_count = units.len();
    let result = ingester.ingest_units(units).await;

    let summary = RunSummary {
        catalog: config.catalog.clone(),
        sink: sink.name().to_string(),
        started_at,
        elapsed_secs: clock.elapsed().as_secs_f64(),
        units: unit_count,
        result,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if result.units_processed == 0 && result.units_failed > 0 {
        bail!("all {} units failed", result.units_failed);
    }
    Ok(())
}

/// Command-line flags win over the file and environment.
fn apply_args(config: &mut IngesterConfig, args: &Args) {
    if let Some(catalog) = &args.catalog {
        config.catalog = catalog.clone();
    }
    if let Some(root) = &args.data_root {
        config.data_root = root.clone();
    }
    if let Some(url) = &args.database_url {
        config.database.url = Some(url.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.ingest.concurrency = concurrency;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
}

fn selection_from(args: &Args, config: &IngesterConfig) -> Result<UnitSelection> {
    if !args.units.is_empty() {
        let units = args
            .units
            .iter()
            .map(|spec| selection::parse_unit(spec))
            .collect::<Result<Vec<_>>>()?;
        return Ok(UnitSelection::Explicit(units));
    }
    if let Some(range) = &args.range {
        let (start, end) = selection::parse_range(range)?;
        return Ok(UnitSelection::Range { start, end });
    }
    if let Some(count) = args.random {
        let seed = args.seed.unwrap_or_else(|| Utc::now().timestamp() as u64);
        info!(count, seed, "Random unit selection");
        return Ok(UnitSelection::Random { count, seed });
    }
    if args.all {
        return Ok(UnitSelection::All);
    }
    config
        .selection
        .clone()
        .context("nothing to ingest; pass --unit, --range, --random or --all")
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}
