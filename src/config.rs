use std::collections::HashMap;

/// Public per-country time series (Johns Hopkins CSSE data, reshaped to JSON).
pub const DATA_URL: &str = "https://pomber.github.io/covid19/timeseries.json";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Trailing window used for every rolling average in the report.
pub const ROLLING_WINDOW: usize = 7;

/// Cumulative death count that starts the "days since 50th death" counter.
pub const DEATH_THRESHOLD: i64 = 50;

/// Decimal places for per-population rates in tables.
pub const TABLE_PRECISION: u32 = 2;

/// Decimal places for per-population rates in summary views.
pub const SUMMARY_PRECISION: u32 = 1;

/// Spectral peaks at or below this frequency (cycles/sample) are ignored.
pub const FREQUENCY_CUTOFF: f64 = 0.1;

pub const DEFAULT_RECENT_DAYS: usize = 7;

/// DuckDB table names and the column types they are registered with.
pub fn table_schemas() -> HashMap<&'static str, &'static [(&'static str, &'static str)]> {
    HashMap::from([
        (
            "timeseries",
            &[
                ("country", "VARCHAR"),
                ("date", "DATE"),
                ("confirmed", "BIGINT"),
                ("deaths", "BIGINT"),
                ("recovered", "BIGINT"),
            ][..],
        ),
        (
            "country_reference",
            &[
                ("country", "VARCHAR"),
                ("population", "DOUBLE"),
                ("lockdown_date", "DATE"),
            ][..],
        ),
        (
            "derived",
            &[
                ("country", "VARCHAR"),
                ("date", "DATE"),
                ("confirmed", "BIGINT"),
                ("deaths", "BIGINT"),
                ("recovered", "BIGINT"),
                ("population", "DOUBLE"),
                ("lockdown_date", "DATE"),
                ("daily_confirmed", "BIGINT"),
                ("daily_deaths", "BIGINT"),
                ("daily_recovered", "BIGINT"),
                ("confirmed_pct_change", "DOUBLE"),
                ("deaths_pct_change", "DOUBLE"),
                ("recovered_pct_change", "DOUBLE"),
                ("daily_confirmed_avg7", "DOUBLE"),
                ("daily_deaths_avg7", "DOUBLE"),
                ("daily_recovered_avg7", "DOUBLE"),
                ("confirmed_per_million", "DOUBLE"),
                ("deaths_per_million", "DOUBLE"),
                ("recovered_per_million", "DOUBLE"),
                ("days_since_lockdown", "BIGINT"),
                ("days_since_50th_death", "BIGINT"),
            ][..],
        ),
    ])
}
