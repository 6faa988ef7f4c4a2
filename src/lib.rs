//! Descriptive COVID-19 statistics report.
//!
//! Fetches a per-country time series of confirmed/deaths/recovered counts,
//! flattens it, joins static reference data (population, lockdown date) in an
//! in-process DuckDB database, derives daily deltas, percentage changes,
//! rolling averages, per-million rates and days-since counters, and renders
//! the result as a Markdown document with SVG charts.
//!
//! # Quick start
//!
//! ```no_run
//! use covid_report::CovidReport;
//!
//! let report = CovidReport::builder().build().unwrap();
//!
//! // Ranked tables
//! let latest = report.tables().latest(&covid_report::Metric::Deaths.into()).unwrap();
//!
//! // Write report.md plus charts
//! report.write("report", Default::default()).unwrap();
//! ```

pub mod config;
pub mod connection;
pub mod derive;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod models;
pub mod periodicity;
pub mod queries;
pub mod report;
pub mod reshape;
pub mod sql_builder;

pub use connection::Connection;
pub use derive::{DerivationEngine, Metric, MetricRequest};
pub use error::{ReportError, Result};
pub use fetch::{Fetcher, Source};
pub use models::{CountryReference, ReferenceData};
pub use queries::Axis;
pub use report::ReportOptions;
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use models::TimeSeriesRow;
use tracing::info;

// ---------------------------------------------------------------------------
// CovidReportBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and running the ingest pipeline.
///
/// Use [`CovidReport::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CovidReportBuilder::build) to fetch, reshape,
/// enrich and derive the data.
pub struct CovidReportBuilder {
    source: Source,
    timeout: Duration,
    reference: Option<ReferenceData>,
    countries: Vec<String>,
    engine: DerivationEngine,
}

impl Default for CovidReportBuilder {
    fn default() -> Self {
        Self {
            source: Source::default(),
            timeout: Duration::from_secs(config::DEFAULT_TIMEOUT_SECS),
            reference: None,
            countries: Vec::new(),
            engine: DerivationEngine::default(),
        }
    }
}

impl CovidReportBuilder {
    /// Fetch from this URL instead of the default endpoint.
    pub fn url(mut self, url: &str) -> Self {
        self.source = Source::Remote(url.to_string());
        self
    }

    /// Read a local snapshot (`.json` or `.json.gz`) instead of fetching.
    pub fn input_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Source::File(path.as_ref().to_path_buf());
        self
    }

    /// Set the HTTP request timeout. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the built-in reference table.
    pub fn reference(mut self, reference: ReferenceData) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Restrict the report to these countries (must exist in the reference table).
    pub fn countries<S: AsRef<str>>(mut self, countries: &[S]) -> Self {
        self.countries = countries.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Override the derivation engine (e.g. a different death threshold).
    pub fn engine(mut self, engine: DerivationEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Run fetch → reshape → enrich → derive. Any failure aborts the run.
    pub fn build(self) -> Result<CovidReport> {
        let reference = self.resolve_reference()?;
        let mut fetcher = Fetcher::new(self.source, self.timeout);
        let doc = fetcher.fetch()?;
        fetcher.close();
        let rows = reshape::flatten(&doc)?;
        info!(rows = rows.len(), "reshaped time series");
        CovidReport::from_rows(&rows, reference, &self.engine)
    }

    fn resolve_reference(&self) -> Result<ReferenceData> {
        let reference = self.reference.clone().unwrap_or_default();
        if self.countries.is_empty() {
            return Ok(reference);
        }
        let names: Vec<&str> = self.countries.iter().map(String::as_str).collect();
        reference.restrict(&names)
    }
}

// ---------------------------------------------------------------------------
// CovidReport
// ---------------------------------------------------------------------------

/// Fully derived data for one report run, held in an in-memory DuckDB
/// database, plus the query and rendering interfaces over it.
pub struct CovidReport {
    conn: Connection,
    reference: ReferenceData,
}

impl CovidReport {
    /// Create a new builder for configuring the pipeline.
    pub fn builder() -> CovidReportBuilder {
        CovidReportBuilder::default()
    }

    /// Enrich and derive already-flattened rows, skipping the fetch.
    pub fn from_rows(
        rows: &[TimeSeriesRow],
        reference: ReferenceData,
        engine: &DerivationEngine,
    ) -> Result<Self> {
        let conn = Connection::new()?;
        let enriched = enrich::enrich(&conn, rows, &reference)?;
        let derived = engine.derive(enriched)?;
        conn.register_rows("derived", &derived)?;
        Ok(Self { conn, reference })
    }

    // -- Query accessors ---------------------------------------------------

    /// Ranked table queries over the derived rows.
    pub fn tables(&self) -> queries::TableQuery<'_> {
        queries::TableQuery::new(&self.conn)
    }

    /// Per-country chart series over the derived rows.
    pub fn series(&self) -> queries::SeriesQuery<'_> {
        queries::SeriesQuery::new(&self.conn)
    }

    /// The reference table the data was enriched with.
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Execute a raw SQL query against the report tables
    /// (`timeseries`, `country_reference`, `derived`).
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Render `report.md` and its charts into `out_dir`.
    pub fn write<P: AsRef<Path>>(&self, out_dir: P, options: ReportOptions) -> Result<PathBuf> {
        report::ReportWriter::new(&self.conn, options).write(out_dir.as_ref())
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl fmt::Display for CovidReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CovidReport(countries=[{}], tables=[{}])",
            self.reference.countries().join(", "),
            self.conn.tables().join(", ")
        )
    }
}
