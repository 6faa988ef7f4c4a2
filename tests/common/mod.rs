//! Shared test fixtures for the report integration tests.
//!
//! Provides a small deterministic two-country data set (plus one country with
//! no reference data) that can be fed to the pipeline either as flat rows or
//! as an upstream-format JSON snapshot on disk.

#![allow(dead_code)]

use chrono::NaiveDate;
use covid_report::models::{CountryReference, EnrichedRow, TimeSeriesRow};
use covid_report::{CovidReport, DerivationEngine, ReferenceData};
use std::path::PathBuf;

/// Number of days in the fixture.
pub const DAYS: i64 = 40;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn start() -> NaiveDate {
    date(2020, 3, 1)
}

/// Norway: lockdown 2020-03-12, 50th death on day 25.
/// Sweden: lockdown 2020-03-29, 50th death on day 17.
pub fn reference() -> ReferenceData {
    ReferenceData::new(vec![
        CountryReference {
            country: "Norway".to_string(),
            population: 5.37,
            lockdown_date: date(2020, 3, 12),
        },
        CountryReference {
            country: "Sweden".to_string(),
            population: 10.33,
            lockdown_date: date(2020, 3, 29),
        },
    ])
    .unwrap()
}

/// Flat rows for Norway, Sweden and Atlantis, sorted by country then date.
pub fn sample_rows() -> Vec<TimeSeriesRow> {
    let mut rows = Vec::new();
    for i in 0..DAYS {
        rows.push(TimeSeriesRow {
            country: "Atlantis".to_string(),
            date: start() + chrono::Duration::days(i),
            confirmed: 1_000 + i,
            deaths: 0,
            recovered: 0,
        });
    }
    for i in 0..DAYS {
        rows.push(TimeSeriesRow {
            country: "Norway".to_string(),
            date: start() + chrono::Duration::days(i),
            confirmed: 100 + 10 * i,
            deaths: 2 * i,
            recovered: i,
        });
    }
    for i in 0..DAYS {
        rows.push(TimeSeriesRow {
            country: "Sweden".to_string(),
            date: start() + chrono::Duration::days(i),
            confirmed: 50 + 20 * i,
            deaths: 3 * i,
            recovered: 0,
        });
    }
    rows
}

/// Fully derived report over [`sample_rows`].
pub fn sample_report() -> CovidReport {
    CovidReport::from_rows(&sample_rows(), reference(), &DerivationEngine::default()).unwrap()
}

/// The fixture in upstream format, with unpadded dates and a `null` counter.
pub fn sample_document() -> serde_json::Value {
    let mut doc = serde_json::Map::new();
    for country in ["Atlantis", "Norway", "Sweden"] {
        let records: Vec<serde_json::Value> = sample_rows()
            .into_iter()
            .filter(|r| r.country == country)
            .map(|r| {
                let recovered = if r.recovered == 0 {
                    serde_json::Value::Null
                } else {
                    serde_json::json!(r.recovered)
                };
                serde_json::json!({
                    "date": r.date.format("%Y-%-m-%-d").to_string(),
                    "confirmed": r.confirmed,
                    "deaths": r.deaths,
                    "recovered": recovered,
                })
            })
            .collect();
        doc.insert(country.to_string(), serde_json::Value::Array(records));
    }
    serde_json::Value::Object(doc)
}

/// Write [`sample_document`] into `dir` and return the file path.
pub fn write_snapshot(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("timeseries.json");
    std::fs::write(&path, serde_json::to_string(&sample_document()).unwrap()).unwrap();
    path
}

/// Enriched rows for a single country with the given cumulative counts.
pub fn enriched_series(
    country: &str,
    population: f64,
    lockdown: NaiveDate,
    confirmed: &[i64],
    deaths: &[i64],
) -> Vec<EnrichedRow> {
    confirmed
        .iter()
        .zip(deaths)
        .enumerate()
        .map(|(i, (&c, &d))| EnrichedRow {
            row: TimeSeriesRow {
                country: country.to_string(),
                date: start() + chrono::Duration::days(i as i64),
                confirmed: c,
                deaths: d,
                recovered: 0,
            },
            population,
            lockdown_date: lockdown,
        })
        .collect()
}
