//! Unit tests for the SqlBuilder query construction.

use covid_report::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("derived").build();
    assert_eq!(sql, "SELECT *\nFROM derived");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("derived")
        .select(&["country", "date"])
        .build();
    assert!(sql.starts_with("SELECT country, date\n"));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("derived")
        .where_eq("country", "Norway")
        .build();
    assert!(sql.contains("WHERE country = ?"));
    assert_eq!(params, vec!["Norway"]);
}

#[test]
fn where_in_adds_in_clause() {
    let (sql, params) = SqlBuilder::new("derived")
        .where_in("country", &["Norway", "Sweden"])
        .build();
    assert!(sql.contains("country IN (?, ?)"));
    assert_eq!(params, vec!["Norway", "Sweden"]);
}

#[test]
fn where_in_empty_is_false() {
    let (sql, params) = SqlBuilder::new("derived").where_in("country", &[]).build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

#[test]
fn typed_range_casts_placeholder() {
    let (sql, params) = SqlBuilder::new("derived")
        .where_gte_typed("date", "2020-03-01", "DATE")
        .where_lte_typed("date", "2020-03-31", "DATE")
        .build();
    assert!(sql.contains("date >= CAST(? AS DATE) AND date <= CAST(? AS DATE)"));
    assert_eq!(params, vec!["2020-03-01", "2020-03-31"]);
}

#[test]
fn where_clause_appends_params_in_order() {
    let (sql, params) = SqlBuilder::new("derived")
        .where_eq("country", "Norway")
        .where_clause("days_since_lockdown BETWEEN ? AND ?", &["1", "7"])
        .build();
    assert!(sql.contains("country = ? AND days_since_lockdown BETWEEN ? AND ?"));
    assert_eq!(params, vec!["Norway", "1", "7"]);
}

// ---------------------------------------------------------------------------
// ORDER BY / LIMIT
// ---------------------------------------------------------------------------

#[test]
fn order_by_and_limit() {
    let (sql, _) = SqlBuilder::new("derived")
        .order_by(&["deaths_per_million DESC NULLS LAST", "country ASC"])
        .limit(5)
        .build();
    assert!(sql.ends_with("ORDER BY deaths_per_million DESC NULLS LAST, country ASC\nLIMIT 5"));
}
