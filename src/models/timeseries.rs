use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawRecord: One day of the upstream JSON document
// ---------------------------------------------------------------------------

/// A single `{date, confirmed, deaths, recovered}` entry as published upstream.
///
/// Dates arrive unpadded (`2020-1-22`) and counters are occasionally `null`,
/// so everything is kept loose here and coerced by the reshaper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: String,
    #[serde(default)]
    pub confirmed: Option<f64>,
    #[serde(default)]
    pub deaths: Option<f64>,
    #[serde(default)]
    pub recovered: Option<f64>,
}

// ---------------------------------------------------------------------------
// TimeSeriesRow: Flat (country, date) row of raw counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub country: String,
    pub date: NaiveDate,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

// ---------------------------------------------------------------------------
// EnrichedRow: Raw row joined with its country's reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    #[serde(flatten)]
    pub row: TimeSeriesRow,
    /// Population in millions.
    pub population: f64,
    pub lockdown_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// DerivedMetrics: Per-row indicators computed by the derivation engine
// ---------------------------------------------------------------------------

/// Indicators attached to each row once its country series is derived.
///
/// `None` marks an undefined value (first day, division by zero, not enough
/// history for the rolling window). It renders as a blank cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub daily_confirmed: Option<i64>,
    pub daily_deaths: Option<i64>,
    pub daily_recovered: Option<i64>,
    pub confirmed_pct_change: Option<f64>,
    pub deaths_pct_change: Option<f64>,
    pub recovered_pct_change: Option<f64>,
    pub daily_confirmed_avg7: Option<f64>,
    pub daily_deaths_avg7: Option<f64>,
    pub daily_recovered_avg7: Option<f64>,
    pub confirmed_per_million: f64,
    pub deaths_per_million: f64,
    pub recovered_per_million: f64,
    pub days_since_lockdown: i64,
    pub days_since_50th_death: i64,
}

// ---------------------------------------------------------------------------
// DerivedRow: What the report tables and charts are built from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub enriched: EnrichedRow,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

impl DerivedRow {
    pub fn country(&self) -> &str {
        &self.enriched.row.country
    }

    pub fn date(&self) -> NaiveDate {
        self.enriched.row.date
    }
}
