#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid series for {country} at {date}: {reason}")]
    InvalidSeries {
        country: String,
        date: chrono::NaiveDate,
        reason: String,
    },

    #[error("Chart error: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ReportError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ReportError::Chart(err.to_string())
    }
}
