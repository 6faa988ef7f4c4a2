//! DuckDB connection wrapper with typed table registration and query execution.
//!
//! Rows are handed to DuckDB as newline-delimited JSON and loaded into tables
//! whose column types come from [`config::table_schemas`], so dates stay
//! `DATE` and sparse derived columns keep their type even when every value is
//! null.

use crate::config;
use crate::error::{ReportError, Result};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::debug;

/// Days from 0001-01-01 (CE) to 1970-01-01, DuckDB's DATE epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Wraps an in-memory DuckDB database holding the report's tables.
pub struct Connection {
    conn: DuckDbConnection,
    registered_tables: RefCell<BTreeSet<String>>,
}

impl Connection {
    /// Open an in-memory DuckDB database.
    pub fn new() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            registered_tables: RefCell::new(BTreeSet::new()),
        })
    }

    /// Replace `table_name` with the given rows.
    ///
    /// Known tables are created with their declared schema; anything else is
    /// loaded with DuckDB's type auto-detection.
    pub fn register_rows<T: Serialize>(&self, table_name: &str, rows: &[T]) -> Result<()> {
        let mut file = NamedTempFile::new()?;
        for row in rows {
            writeln!(file, "{}", serde_json::to_string(row)?)?;
        }
        file.flush()?;

        let path = file.path().to_string_lossy().to_string();
        let schemas = config::table_schemas();
        match schemas.get(table_name) {
            Some(schema) => {
                self.register_table_from_ndjson_with_schema(table_name, &path, schema, rows.is_empty())
            }
            None if rows.is_empty() => Err(ReportError::InvalidArgument(format!(
                "Cannot infer a schema for empty table {}",
                table_name
            ))),
            None => self.register_table_from_ndjson(table_name, &path),
        }
        // The temp file is removed on drop; DuckDB has copied the data by now.
    }

    /// Create a DuckDB table from a newline-delimited JSON file, letting
    /// DuckDB infer column types.
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table_name, table_name, path_fwd
        ))?;
        self.registered_tables.borrow_mut().insert(table_name.to_string());
        debug!(table = table_name, "registered table (inferred schema)");
        Ok(())
    }

    /// Create a typed DuckDB table and fill it from a newline-delimited JSON
    /// file. Columns missing from a JSON object load as NULL.
    pub fn register_table_from_ndjson_with_schema(
        &self,
        table_name: &str,
        ndjson_path: &str,
        schema: &[(&str, &str)],
        empty: bool,
    ) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/");
        let col_defs: Vec<String> = schema
            .iter()
            .map(|(name, ty)| format!("\"{}\" {}", name, ty))
            .collect();
        let mut sql = format!(
            "DROP TABLE IF EXISTS {}; CREATE TABLE {} ({});",
            table_name,
            table_name,
            col_defs.join(", ")
        );
        if !empty {
            let col_struct: Vec<String> = schema
                .iter()
                .map(|(name, ty)| format!("'{}': '{}'", name, ty))
                .collect();
            sql.push_str(&format!(
                " INSERT INTO {} SELECT * FROM read_json('{}', \
                 format='newline_delimited', columns={{{}}});",
                table_name,
                path_fwd,
                col_struct.join(", ")
            ));
        }
        self.conn.execute_batch(&sql)?;
        self.registered_tables.borrow_mut().insert(table_name.to_string());
        debug!(table = table_name, columns = schema.len(), "registered table");
        Ok(())
    }

    /// Fail with `NotFound` unless every listed table has been registered.
    pub fn ensure_tables(&self, tables: &[&str]) -> Result<()> {
        for name in tables {
            if !self.has_table(name) {
                return Err(ReportError::NotFound(format!(
                    "Table {} has not been loaded",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the query has run.
        let (column_names, column_count) = {
            let stmt_ref = rows_result.as_ref().ok_or_else(|| {
                ReportError::InvalidArgument("Query produced no statement".to_string())
            })?;
            let names: Vec<String> = stmt_ref
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            (names, stmt_ref.column_count())
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate().take(column_count) {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.registered_tables.borrow().contains(name)
    }

    /// Registered table names, sorted.
    pub fn tables(&self) -> Vec<String> {
        self.registered_tables.borrow().iter().cloned().collect()
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
///
/// Dates become ISO `YYYY-MM-DD` strings; non-finite doubles become null.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;
    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UTinyInt(n) => Value::Number(n.into()),
        ValueRef::USmallInt(n) => Value::Number(n.into()),
        ValueRef::UInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(chrono::NaiveDate::from_num_days_from_ce_opt)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
