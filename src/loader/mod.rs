//! Load stage: hand the cleaned products to every configured sink.
//!
//! Sinks are independent. Each one is attempted in turn and a failure is
//! logged and recorded without stopping the others.

pub mod csv_file;
pub mod sheets;

use crate::config::LoadConfig;
use crate::models::CleanedProduct;
use crate::storage::Repository;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub use self::csv_file::CsvSink;
pub use self::sheets::SheetsSink;

// ── Sink trait ────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LoadSink: Send + Sync {
    fn name(&self) -> &str;

    /// Persist the full product set. Returns the number of rows written.
    async fn load(&self, products: &[CleanedProduct]) -> Result<usize>;
}

// ── Relational table ──────────────────────────────────────────────────────────

pub struct DuckDbSink {
    db_path: PathBuf,
    table: String,
}

impl DuckDbSink {
    pub fn new(db_path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self { db_path: db_path.into(), table: table.into() }
    }
}

#[async_trait]
impl LoadSink for DuckDbSink {
    fn name(&self) -> &str {
        "duckdb"
    }

    async fn load(&self, products: &[CleanedProduct]) -> Result<usize> {
        let repo = Repository::open(&self.db_path)?;
        repo.replace_products(&self.table, products)
    }
}

// ── Fan-out ───────────────────────────────────────────────────────────────────

/// Sinks built from configuration, plus the ones that could not be built.
pub struct SinkSet {
    pub sinks: Vec<Box<dyn LoadSink>>,
    /// `(sink name, error)` for every enabled sink whose setup failed.
    pub unavailable: Vec<(String, String)>,
}

/// Every sink the configuration enables: CSV and DuckDB always, the
/// spreadsheet only when it has an id and a token. A sink that fails to
/// build is logged and reported, never fatal.
pub fn configured_sinks(config: &LoadConfig) -> SinkSet {
    let mut set = SinkSet {
        sinks: vec![Box::new(CsvSink::new(&config.csv_path))],
        unavailable: Vec::new(),
    };

    if config.sheets.is_enabled() {
        match SheetsSink::new(&config.sheets) {
            Ok(sink) => set.sinks.push(Box::new(sink)),
            Err(e) => {
                error!("{}: setup failed: {:#}", sheets::SINK_NAME, e);
                set.unavailable.push((sheets::SINK_NAME.to_string(), format!("{:#}", e)));
            }
        }
    } else {
        info!("Spreadsheet sink not configured, skipping");
    }

    set.sinks.push(Box::new(DuckDbSink::new(&config.db_path, &config.table_name)));
    set
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub succeeded: Vec<(String, usize)>,
    pub failed: Vec<(String, String)>,
    pub skipped: Vec<String>,
}

/// Build the configured sinks and load into each. Setup failures land in
/// `failed` next to load failures.
pub async fn load_configured(config: &LoadConfig, products: &[CleanedProduct]) -> LoadReport {
    let SinkSet { sinks, unavailable } = configured_sinks(config);
    let mut report = load_all(&sinks, products).await;
    report.failed.extend(unavailable);
    report
}

pub async fn load_all(sinks: &[Box<dyn LoadSink>], products: &[CleanedProduct]) -> LoadReport {
    let mut report = LoadReport::default();

    for sink in sinks {
        let name = sink.name().to_string();

        if products.is_empty() {
            warn!("{}: no data to write", name);
            report.skipped.push(name);
            continue;
        }

        match sink.load(products).await {
            Ok(n) => {
                info!("{}: {} records saved", name, n);
                report.succeeded.push((name, n));
            }
            Err(e) => {
                error!("{}: load failed: {:#}", name, e);
                report.failed.push((name, format!("{:#}", e)));
            }
        }
    }

    report
}
