//! Ranked table queries against the DuckDB `derived` table.

use chrono::NaiveDate;

use crate::connection::Connection;
use crate::derive::MetricRequest;
use crate::error::{ReportError, Result};
use crate::models::DerivedRow;
use crate::queries::{stored_column, Axis};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// TableQuery
// ---------------------------------------------------------------------------

/// Query interface for the report's tables, backed by the `derived` table.
pub struct TableQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TableQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Countries present in the derived data, sorted by name.
    pub fn countries(&self) -> Result<Vec<String>> {
        self.conn.ensure_tables(&["derived"])?;
        let (sql, params) = SqlBuilder::new("derived")
            .select(&["DISTINCT country"])
            .order_by(&["country ASC"])
            .build();
        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.get("country").and_then(|v| v.as_str()).map(String::from))
            .collect())
    }

    /// First and last date in the derived data, if any.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        self.conn.ensure_tables(&["derived"])?;
        let rows = self.conn.execute(
            "SELECT MIN(date) AS first_date, MAX(date) AS last_date FROM derived",
            &[],
        )?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let date = |key: &str| -> Result<Option<NaiveDate>> {
            match row.get(key).and_then(|v| v.as_str()) {
                Some(s) => Ok(Some(s.parse::<NaiveDate>()?)),
                None => Ok(None),
            }
        };
        Ok(date("first_date")?.zip(date("last_date")?))
    }

    /// All rows of one country in date order.
    pub fn country_rows(&self, country: &str) -> Result<Vec<DerivedRow>> {
        self.conn.ensure_tables(&["derived"])?;
        let (sql, params) = SqlBuilder::new("derived")
            .where_eq("country", country)
            .order_by(&["date ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Each country's most recent row, ranked by `rank_by` descending.
    pub fn latest(&self, rank_by: &MetricRequest) -> Result<Vec<DerivedRow>> {
        self.conn.ensure_tables(&["derived"])?;
        let order = rank_clause(rank_by)?;
        let (sql, params) = SqlBuilder::new("derived d")
            .where_clause(
                "d.date = (SELECT MAX(m.date) FROM derived m WHERE m.country = d.country)",
                &[],
            )
            .order_by(&[order.as_str(), "country ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Rows from the most recent `days` days, newest first, ranked by
    /// `rank_by` within a day.
    pub fn recent(&self, days: usize, rank_by: &MetricRequest) -> Result<Vec<DerivedRow>> {
        self.conn.ensure_tables(&["derived"])?;
        if days == 0 {
            return Err(ReportError::InvalidArgument(
                "Recent window must cover at least one day".to_string(),
            ));
        }
        let order = rank_clause(rank_by)?;
        let days_param = days.to_string();
        let (sql, params) = SqlBuilder::new("derived")
            .where_clause(
                "date > (SELECT MAX(date) FROM derived) - CAST(? AS INTEGER)",
                &[days_param.as_str()],
            )
            .order_by(&["date DESC", order.as_str(), "country ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Rows sitting exactly `value` steps along a counter axis, ranked by
    /// `rank_by`. Countries that have not reached `value` are absent.
    pub fn at_axis(&self, axis: Axis, value: i64, rank_by: &MetricRequest) -> Result<Vec<DerivedRow>> {
        if !axis.is_counter() {
            return Err(ReportError::InvalidArgument(
                "at_axis needs a counter axis".to_string(),
            ));
        }
        if value < 1 {
            return Err(ReportError::InvalidArgument(format!(
                "{} must be positive, got {}",
                axis.label(),
                value
            )));
        }
        self.conn.ensure_tables(&["derived"])?;
        let order = rank_clause(rank_by)?;
        let value_param = value.to_string();
        let (sql, params) = SqlBuilder::new("derived")
            .where_clause(
                &format!("{} = CAST(? AS BIGINT)", axis.column()),
                &[value_param.as_str()],
            )
            .order_by(&[order.as_str(), "country ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// One country's rows with a positive counter, in axis order.
    pub fn positive_axis(&self, country: &str, axis: Axis) -> Result<Vec<DerivedRow>> {
        self.conn.ensure_tables(&["derived"])?;
        let mut qb = SqlBuilder::new("derived");
        qb.where_eq("country", country);
        if axis.is_counter() {
            qb.where_gte_typed(axis.column(), "1", "BIGINT");
        }
        let order = format!("{} ASC", axis.column());
        qb.order_by(&[order.as_str(), "date ASC"]);
        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Number of derived rows.
    pub fn count(&self) -> Result<i64> {
        self.conn.ensure_tables(&["derived"])?;
        let value = self.conn.execute_scalar("SELECT COUNT(*) FROM derived", &[])?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }
}

fn rank_clause(rank_by: &MetricRequest) -> Result<String> {
    stored_column(rank_by)
        .map(|col| format!("{} DESC NULLS LAST", col))
        .ok_or_else(|| {
            ReportError::InvalidArgument(format!(
                "Cannot rank by '{}': not a stored column",
                rank_by.label()
            ))
        })
}
