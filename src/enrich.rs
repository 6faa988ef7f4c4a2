//! Joins raw rows with static per-country reference data inside DuckDB.

use tracing::{info, warn};

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{EnrichedRow, ReferenceData, TimeSeriesRow};

const ENRICH_SQL: &str = r#"
    SELECT t.country, t.date, t.confirmed, t.deaths, t.recovered,
           r.population, r.lockdown_date
    FROM timeseries t
    JOIN country_reference r ON t.country = r.country
    ORDER BY t.country ASC, t.date ASC
"#;

/// Register the raw rows and the reference table, then return the inner
/// join ordered by `(country, date)`.
///
/// Countries without reference data are dropped; reference countries with no
/// rows are logged.
pub fn enrich(
    conn: &Connection,
    rows: &[TimeSeriesRow],
    reference: &ReferenceData,
) -> Result<Vec<EnrichedRow>> {
    conn.register_rows("timeseries", rows)?;
    conn.register_rows("country_reference", reference.entries())?;

    let enriched: Vec<EnrichedRow> = conn.execute_into(ENRICH_SQL, &[])?;

    for missing in missing_countries(conn)? {
        warn!(country = %missing, "reference country has no rows in the data");
    }
    info!(rows = enriched.len(), "enriched time series");
    Ok(enriched)
}

/// Reference countries absent from the `timeseries` table.
pub fn missing_countries(conn: &Connection) -> Result<Vec<String>> {
    conn.ensure_tables(&["timeseries", "country_reference"])?;
    let rows = conn.execute(
        "SELECT r.country FROM country_reference r \
         WHERE r.country NOT IN (SELECT DISTINCT country FROM timeseries) \
         ORDER BY r.country",
        &[],
    )?;
    Ok(rows
        .into_iter()
        .filter_map(|r| r.get("country").and_then(|v| v.as_str()).map(String::from))
        .collect())
}
