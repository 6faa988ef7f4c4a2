use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use covid_report::{config, CovidReport, ReferenceData, ReportOptions};

/// Fetch the per-country COVID-19 time series and write a Markdown report
/// with SVG charts.
#[derive(Debug, Parser)]
#[command(name = "covid-report", version, about)]
struct Args {
    /// Time-series endpoint.
    #[arg(long, default_value = config::DATA_URL, conflicts_with = "input")]
    url: String,

    /// Local snapshot (.json or .json.gz) to use instead of the endpoint.
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON array of {country, population, lockdown_date} replacing the
    /// built-in reference table.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Only report these countries.
    #[arg(long, value_delimiter = ',')]
    countries: Vec<String>,

    /// Output directory for report.md and charts.
    #[arg(long, default_value = "report")]
    out: PathBuf,

    /// Days covered by the recent-days table.
    #[arg(long, default_value_t = config::DEFAULT_RECENT_DAYS)]
    recent_days: usize,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(path) => {
            info!(path = %path.display(), "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> covid_report::Result<PathBuf> {
    let mut builder = CovidReport::builder()
        .timeout(Duration::from_secs(args.timeout))
        .countries(&args.countries);
    builder = match args.input {
        Some(path) => builder.input_file(path),
        None => builder.url(&args.url),
    };
    if let Some(path) = args.reference {
        builder = builder.reference(ReferenceData::from_json_file(path)?);
    }

    let report = builder.build()?;
    info!("{}", report);

    let options = ReportOptions {
        recent_days: args.recent_days,
        ..ReportOptions::default()
    };
    report.write(&args.out, options)
}
