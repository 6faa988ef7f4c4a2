//! Flattens the nested `{country: [{date, ...}]}` document into flat rows.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::fetch::RawDocument;
use crate::models::{RawRecord, TimeSeriesRow};

/// Flatten the upstream document into one row per (country, date), sorted by
/// country then date.
///
/// Only type coercion happens here: `null` counters become 0, fractional
/// counters are truncated. Dates that do not parse abort the run since the
/// document is then not the format this report understands.
pub fn flatten(doc: &RawDocument) -> Result<Vec<TimeSeriesRow>> {
    let mut rows = Vec::with_capacity(doc.values().map(Vec::len).sum());
    for (country, records) in doc {
        for record in records {
            rows.push(to_row(country, record)?);
        }
        debug!(country = %country, days = records.len(), "flattened country");
    }
    rows.sort_by(|a, b| a.country.cmp(&b.country).then(a.date.cmp(&b.date)));
    Ok(rows)
}

fn to_row(country: &str, record: &RawRecord) -> Result<TimeSeriesRow> {
    Ok(TimeSeriesRow {
        country: country.to_string(),
        date: parse_date(&record.date)?,
        confirmed: coerce_count(record.confirmed),
        deaths: coerce_count(record.deaths),
        recovered: coerce_count(record.recovered),
    })
}

/// Parse `YYYY-M-D` dates; zero padding is optional.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(ReportError::from)
}

fn coerce_count(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() => v as i64,
        _ => 0,
    }
}
