//! Per-country plot series built from the derived table.

use crate::connection::Connection;
use crate::derive::MetricRequest;
use crate::error::Result;
use crate::models::{DerivedRow, EnrichedRow};
use crate::periodicity::PeriodEstimator;
use crate::queries::{Axis, TableQuery};

/// One country's line: `(x, y)` points with undefined values left out.
///
/// On the date axis `x` is the day number counted from 0001-01-01 (see
/// `chrono::Datelike::num_days_from_ce`); on counter axes it is the counter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub country: String,
    pub points: Vec<(i64, f64)>,
}

impl ChartSeries {
    pub fn last(&self) -> Option<(i64, f64)> {
        self.points.last().copied()
    }
}

/// Query interface that evaluates [`MetricRequest`]s per country.
pub struct SeriesQuery<'a> {
    conn: &'a Connection,
}

impl<'a> SeriesQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Evaluate `req` for every country and lay it out along `axis`.
    ///
    /// Counter axes keep only rows at or after the reference event.
    /// Countries with no defined point are dropped.
    pub fn series(&self, req: &MetricRequest, axis: Axis) -> Result<Vec<ChartSeries>> {
        let tables = TableQuery::new(self.conn);
        let mut out = Vec::new();
        for country in tables.countries()? {
            let rows = tables.country_rows(&country)?;
            let values = req.evaluate(&enriched(&rows));
            let points: Vec<(i64, f64)> = rows
                .iter()
                .zip(values)
                .filter_map(|(row, y)| {
                    let x = axis_value(row, axis);
                    if axis.is_counter() && x < 1 {
                        return None;
                    }
                    y.map(|y| (x, y))
                })
                .collect();
            if !points.is_empty() {
                out.push(ChartSeries { country, points });
            }
        }
        Ok(out)
    }

    /// Most recent defined value of `req` per country, largest first.
    pub fn latest_values(&self, req: &MetricRequest) -> Result<Vec<(String, f64)>> {
        let mut latest: Vec<(String, f64)> = self
            .series(req, Axis::Date)?
            .into_iter()
            .filter_map(|s| s.last().map(|(_, y)| (s.country, y)))
            .collect();
        latest.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(latest)
    }

    /// Dominant reporting period of `req` per country; `None` where the
    /// spectrum has no usable peak.
    pub fn dominant_periods(
        &self,
        req: &MetricRequest,
        estimator: &PeriodEstimator,
    ) -> Result<Vec<(String, Option<f64>)>> {
        let tables = TableQuery::new(self.conn);
        let mut out = Vec::new();
        for country in tables.countries()? {
            let rows = tables.country_rows(&country)?;
            let values = req.evaluate(&enriched(&rows));
            out.push((country, estimator.dominant_period(&values)));
        }
        Ok(out)
    }
}

fn enriched(rows: &[DerivedRow]) -> Vec<EnrichedRow> {
    rows.iter().map(|r| r.enriched.clone()).collect()
}

fn axis_value(row: &DerivedRow, axis: Axis) -> i64 {
    use chrono::Datelike;
    match axis {
        Axis::Date => i64::from(row.date().num_days_from_ce()),
        Axis::DaysSinceLockdown => row.metrics.days_since_lockdown,
        Axis::DaysSince50thDeath => row.metrics.days_since_50th_death,
    }
}
