pub mod series;
pub mod tables;

pub use series::{ChartSeries, SeriesQuery};
pub use tables::TableQuery;

use crate::derive::{Metric, MetricRequest};

/// Horizontal reference a view is laid out against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Date,
    DaysSinceLockdown,
    DaysSince50thDeath,
}

impl Axis {
    pub fn column(self) -> &'static str {
        match self {
            Axis::Date => "date",
            Axis::DaysSinceLockdown => "days_since_lockdown",
            Axis::DaysSince50thDeath => "days_since_50th_death",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::Date => "date",
            Axis::DaysSinceLockdown => "days since lockdown",
            Axis::DaysSince50thDeath => "days since 50th death",
        }
    }

    /// Counter axes only show rows after the reference event.
    pub fn is_counter(self) -> bool {
        self != Axis::Date
    }
}

/// Column of the `derived` table that stores the value of `req`, if the
/// combination is one the engine materializes.
pub fn stored_column(req: &MetricRequest) -> Option<&'static str> {
    let MetricRequest {
        metric,
        per_population,
        rolling,
        percentage,
    } = *req;
    match (metric, per_population, rolling, percentage) {
        (Metric::Confirmed, false, false, false) => Some("confirmed"),
        (Metric::Deaths, false, false, false) => Some("deaths"),
        (Metric::Recovered, false, false, false) => Some("recovered"),
        (Metric::Confirmed, true, false, false) => Some("confirmed_per_million"),
        (Metric::Deaths, true, false, false) => Some("deaths_per_million"),
        (Metric::Recovered, true, false, false) => Some("recovered_per_million"),
        (Metric::Confirmed, false, false, true) => Some("confirmed_pct_change"),
        (Metric::Deaths, false, false, true) => Some("deaths_pct_change"),
        (Metric::Recovered, false, false, true) => Some("recovered_pct_change"),
        (Metric::DailyConfirmed, false, false, false) => Some("daily_confirmed"),
        (Metric::DailyDeaths, false, false, false) => Some("daily_deaths"),
        (Metric::DailyRecovered, false, false, false) => Some("daily_recovered"),
        (Metric::DailyConfirmed, false, true, false) => Some("daily_confirmed_avg7"),
        (Metric::DailyDeaths, false, true, false) => Some("daily_deaths_avg7"),
        (Metric::DailyRecovered, false, true, false) => Some("daily_recovered_avg7"),
        _ => None,
    }
}
