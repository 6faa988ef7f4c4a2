//! Derivation engine: turns enriched per-country daily series into rows with
//! every derived indicator attached.
//!
//! All fields are functions of one country's own ordered rows and its
//! reference data; countries never influence each other.

pub mod pipeline;
pub mod transforms;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config;
use crate::error::{ReportError, Result};
use crate::models::{DerivedMetrics, DerivedRow, EnrichedRow};
pub use pipeline::{Metric, MetricRequest, Transform};
pub use transforms::Series;

/// Computes [`DerivedMetrics`] for every row of every country.
#[derive(Debug, Clone)]
pub struct DerivationEngine {
    death_threshold: i64,
}

impl Default for DerivationEngine {
    fn default() -> Self {
        Self {
            death_threshold: config::DEATH_THRESHOLD,
        }
    }
}

impl DerivationEngine {
    pub fn new(death_threshold: i64) -> Self {
        Self { death_threshold }
    }

    /// Derive all rows. Input must be grouped by country and, within a
    /// country, sorted by date with one row per day.
    pub fn derive(&self, rows: Vec<EnrichedRow>) -> Result<Vec<DerivedRow>> {
        let mut out = Vec::with_capacity(rows.len());
        let mut seen: HashSet<String> = HashSet::new();

        for group in rows.chunk_by(|a, b| a.row.country == b.row.country) {
            let country = &group[0].row.country;
            if !seen.insert(country.clone()) {
                return Err(ReportError::InvalidSeries {
                    country: country.clone(),
                    date: group[0].row.date,
                    reason: "country rows are not contiguous".to_string(),
                });
            }
            validate_series(group)?;
            out.extend(self.derive_country(group));
            debug!(country = %country, days = group.len(), "derived country series");
        }

        info!(countries = seen.len(), rows = out.len(), "derived metrics");
        Ok(out)
    }

    /// Derive one country's rows. Callers must have validated the ordering.
    pub fn derive_country(&self, rows: &[EnrichedRow]) -> Vec<DerivedRow> {
        let eval = |req: MetricRequest| req.evaluate(rows);

        let daily = |m: Metric| transforms::daily_delta(&m.raw_counts(rows));
        let daily_confirmed = daily(Metric::Confirmed);
        let daily_deaths = daily(Metric::Deaths);
        let daily_recovered = daily(Metric::Recovered);

        let pct = |m: Metric| eval(MetricRequest::new(m).percentage(true));
        let confirmed_pct = pct(Metric::Confirmed);
        let deaths_pct = pct(Metric::Deaths);
        let recovered_pct = pct(Metric::Recovered);

        let avg = |m: Metric| eval(MetricRequest::new(m).rolling(true));
        let confirmed_avg = avg(Metric::DailyConfirmed);
        let deaths_avg = avg(Metric::DailyDeaths);
        let recovered_avg = avg(Metric::DailyRecovered);

        let per_million = |m: Metric| eval(MetricRequest::new(m).per_population(true));
        let confirmed_pm = per_million(Metric::Confirmed);
        let deaths_pm = per_million(Metric::Deaths);
        let recovered_pm = per_million(Metric::Recovered);

        let lockdown_flags: Vec<bool> = rows
            .iter()
            .map(|r| r.row.date >= r.lockdown_date)
            .collect();
        let death_flags: Vec<bool> = rows
            .iter()
            .map(|r| r.row.deaths >= self.death_threshold)
            .collect();
        let since_lockdown = transforms::cumulative_count(&lockdown_flags);
        let since_deaths = transforms::cumulative_count(&death_flags);

        rows.iter()
            .enumerate()
            .map(|(i, row)| DerivedRow {
                enriched: row.clone(),
                metrics: DerivedMetrics {
                    daily_confirmed: daily_confirmed[i],
                    daily_deaths: daily_deaths[i],
                    daily_recovered: daily_recovered[i],
                    confirmed_pct_change: confirmed_pct[i],
                    deaths_pct_change: deaths_pct[i],
                    recovered_pct_change: recovered_pct[i],
                    daily_confirmed_avg7: confirmed_avg[i],
                    daily_deaths_avg7: deaths_avg[i],
                    daily_recovered_avg7: recovered_avg[i],
                    confirmed_per_million: confirmed_pm[i].unwrap_or_default(),
                    deaths_per_million: deaths_pm[i].unwrap_or_default(),
                    recovered_per_million: recovered_pm[i].unwrap_or_default(),
                    days_since_lockdown: since_lockdown[i],
                    days_since_50th_death: since_deaths[i],
                },
            })
            .collect()
    }
}

/// Check a single country's rows are strictly consecutive days.
///
/// Counters and rolling windows are positional, so an unsorted series, a
/// repeated date or a missing day would silently shift every value.
pub fn validate_series(rows: &[EnrichedRow]) -> Result<()> {
    for pair in rows.windows(2) {
        let (prev, cur) = (&pair[0].row, &pair[1].row);
        let reason = if cur.country != prev.country {
            Some("mixed countries in one series".to_string())
        } else if cur.date == prev.date {
            Some("duplicate date".to_string())
        } else if cur.date < prev.date {
            Some(format!("out of order after {}", prev.date))
        } else if (cur.date - prev.date).num_days() != 1 {
            Some(format!("gap after {}", prev.date))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ReportError::InvalidSeries {
                country: cur.country.clone(),
                date: cur.date,
                reason,
            });
        }
    }
    Ok(())
}
