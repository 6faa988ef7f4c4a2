//! Typed metric selection and the fixed transform order.
//!
//! A [`MetricRequest`] names a base [`Metric`] plus three toggles. It always
//! evaluates as: base value → per-population → rolling average → percentage
//! change, each step reading the output of the previous one.

use std::fmt;

use crate::config;
use crate::derive::transforms::{self, Series};
use crate::models::EnrichedRow;

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// Quantities a report view can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
    DailyConfirmed,
    DailyDeaths,
    DailyRecovered,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Confirmed,
        Metric::Deaths,
        Metric::Recovered,
        Metric::DailyConfirmed,
        Metric::DailyDeaths,
        Metric::DailyRecovered,
    ];

    /// Cumulative counter this metric is read from.
    pub fn counter(self) -> Metric {
        match self {
            Metric::Confirmed | Metric::DailyConfirmed => Metric::Confirmed,
            Metric::Deaths | Metric::DailyDeaths => Metric::Deaths,
            Metric::Recovered | Metric::DailyRecovered => Metric::Recovered,
        }
    }

    pub fn is_daily(self) -> bool {
        self != self.counter()
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recovered",
            Metric::DailyConfirmed => "daily confirmed",
            Metric::DailyDeaths => "daily deaths",
            Metric::DailyRecovered => "daily recovered",
        }
    }

    /// Cumulative counter values for one country's rows.
    pub(crate) fn raw_counts(self, rows: &[EnrichedRow]) -> Vec<i64> {
        rows.iter()
            .map(|r| match self.counter() {
                Metric::Deaths => r.row.deaths,
                Metric::Recovered => r.row.recovered,
                _ => r.row.confirmed,
            })
            .collect()
    }

    /// Untransformed values for one country's rows. Daily metrics take the
    /// lag delta here, before any other step sees them.
    pub fn base_series(self, rows: &[EnrichedRow]) -> Series {
        let raw = self.raw_counts(rows);
        if self.is_daily() {
            transforms::from_optional_counts(&transforms::daily_delta(&raw))
        } else {
            transforms::from_counts(&raw)
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// One named step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    PerPopulation { precision: u32 },
    Rolling { window: usize },
    PercentChange,
}

impl Transform {
    pub fn apply(self, series: &[Option<f64>], population: f64) -> Series {
        match self {
            Transform::PerPopulation { precision } => {
                transforms::per_population(series, population, precision)
            }
            Transform::Rolling { window } => transforms::rolling_mean(series, window),
            Transform::PercentChange => transforms::pct_change(series),
        }
    }
}

// ---------------------------------------------------------------------------
// MetricRequest
// ---------------------------------------------------------------------------

/// A metric plus the transforms requested on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricRequest {
    pub metric: Metric,
    pub per_population: bool,
    pub rolling: bool,
    pub percentage: bool,
}

impl MetricRequest {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            per_population: false,
            rolling: false,
            percentage: false,
        }
    }

    pub fn per_population(mut self, on: bool) -> Self {
        self.per_population = on;
        self
    }

    pub fn rolling(mut self, on: bool) -> Self {
        self.rolling = on;
        self
    }

    pub fn percentage(mut self, on: bool) -> Self {
        self.percentage = on;
        self
    }

    /// Enabled steps in application order.
    pub fn steps(&self) -> Vec<Transform> {
        let mut steps = Vec::with_capacity(3);
        if self.per_population {
            steps.push(Transform::PerPopulation {
                precision: config::TABLE_PRECISION,
            });
        }
        if self.rolling {
            steps.push(Transform::Rolling {
                window: config::ROLLING_WINDOW,
            });
        }
        if self.percentage {
            steps.push(Transform::PercentChange);
        }
        steps
    }

    /// Evaluate over one country's date-ordered rows.
    pub fn evaluate(&self, rows: &[EnrichedRow]) -> Series {
        let Some(first) = rows.first() else {
            return Vec::new();
        };
        let population = first.population;
        self.steps()
            .into_iter()
            .fold(self.metric.base_series(rows), |series, step| {
                step.apply(&series, population)
            })
    }

    /// Human-readable name, e.g. "daily deaths per million, 7-day avg".
    pub fn label(&self) -> String {
        let mut label = self.metric.label().to_string();
        if self.per_population {
            label.push_str(" per million");
        }
        if self.rolling {
            label.push_str(&format!(", {}-day avg", config::ROLLING_WINDOW));
        }
        if self.percentage {
            label.push_str(", % change");
        }
        label
    }
}

impl From<Metric> for MetricRequest {
    fn from(metric: Metric) -> Self {
        MetricRequest::new(metric)
    }
}
