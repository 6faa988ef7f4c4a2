//! SQL builder with parameterized query construction.
//!
//! Values go through DuckDB's parameter binding (`?` placeholders) and are
//! bound as text, so comparisons against typed columns cast the placeholder
//! explicitly. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use covid_report::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("derived")
//!     .where_eq("country", "Norway")
//!     .where_gte_typed("days_since_lockdown", "1", "BIGINT")
//!     .order_by(&["date ASC"])
//!     .limit(10)
//!     .build();
//! ```

/// Builds parameterized SQL queries.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a WHERE condition using `?` for each parameter, appended in order.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition on a text column: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add an IN condition with parameterized values.
    ///
    /// Empty values list produces `FALSE`.
    pub fn where_in(&mut self, column: &str, values: &[&str]) -> &mut Self {
        if values.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
        self.where_clauses
            .push(format!("{} IN ({})", column, placeholders.join(", ")));
        self.params.extend(values.iter().map(|v| v.to_string()));
        self
    }

    /// Add `{column} >= CAST(? AS {sql_type})`.
    pub fn where_gte_typed(&mut self, column: &str, value: &str, sql_type: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} >= CAST(? AS {})", column, sql_type));
        self.params.push(value.to_string());
        self
    }

    /// Add `{column} <= CAST(? AS {sql_type})`.
    pub fn where_lte_typed(&mut self, column: &str, value: &str, sql_type: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} <= CAST(? AS {})", column, sql_type));
        self.params.push(value.to_string());
        self
    }

    /// Add ORDER BY clauses (e.g. `"date ASC"`, `"deaths_per_million DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
