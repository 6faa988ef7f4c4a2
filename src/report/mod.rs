//! Report document generation: Markdown tables plus SVG charts.
//!
//! Every view reads from the `derived` table through [`TableQuery`] and
//! [`SeriesQuery`]. `report.md` is written last, through a temp file that is
//! renamed into place, so a failed run never leaves a partial report behind.

pub mod charts;
pub mod table;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config;
use crate::connection::Connection;
use crate::derive::{Metric, MetricRequest};
use crate::error::Result;
use crate::periodicity::PeriodEstimator;
use crate::queries::{Axis, SeriesQuery, TableQuery};
use charts::CountryColors;
use table::{int_cell, num_cell, opt_int_cell, MarkdownTable};

pub const REPORT_FILE: &str = "report.md";

/// What goes into the document.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    /// Days covered by the "most recent days" table.
    pub recent_days: usize,
    /// Days-since-50th-death value the comparison table is taken at.
    pub milestone_day: i64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "COVID-19 country report".to_string(),
            recent_days: config::DEFAULT_RECENT_DAYS,
            milestone_day: 30,
        }
    }
}

/// Writes the report for the data currently loaded in a [`Connection`].
pub struct ReportWriter<'a> {
    conn: &'a Connection,
    options: ReportOptions,
}

impl<'a> ReportWriter<'a> {
    pub fn new(conn: &'a Connection, options: ReportOptions) -> Self {
        Self { conn, options }
    }

    /// Render every table and chart into `out_dir` and return the path of
    /// the Markdown document.
    pub fn write(&self, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let tables = TableQuery::new(self.conn);
        let series = SeriesQuery::new(self.conn);
        let countries = tables.countries()?;
        let colors = CountryColors::new(&countries);

        let mut doc = String::new();
        doc.push_str(&format!("# {}\n\n", self.options.title));
        match tables.date_range()? {
            Some((first, last)) => doc.push_str(&format!(
                "Data from {} to {} for {} countries.\n\n",
                first,
                last,
                countries.len()
            )),
            None => doc.push_str("No data.\n\n"),
        }

        self.latest_section(&mut doc, &tables, &series, &colors, out_dir)?;
        self.recent_section(&mut doc, &tables, &series, &colors, out_dir)?;
        self.deaths_section(&mut doc, &tables, &series, &colors, out_dir)?;
        self.lockdown_section(&mut doc, &series, &colors, out_dir)?;
        self.cycle_section(&mut doc, &series)?;

        let final_path = out_dir.join(REPORT_FILE);
        let tmp_path = out_dir.join(format!("{}.tmp", REPORT_FILE));
        let result = fs::write(&tmp_path, &doc).and_then(|_| fs::rename(&tmp_path, &final_path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result?;

        info!(path = %final_path.display(), "wrote report");
        Ok(final_path)
    }

    fn latest_section(
        &self,
        doc: &mut String,
        tables: &TableQuery<'_>,
        series: &SeriesQuery<'_>,
        colors: &CountryColors,
        out_dir: &Path,
    ) -> Result<()> {
        doc.push_str("## Latest totals\n\n");
        let rank_by = MetricRequest::new(Metric::Confirmed).per_population(true);
        let rows = tables.latest(&rank_by)?;

        let mut t = MarkdownTable::new(&[
            "Country",
            "Date",
            "Confirmed",
            "Deaths",
            "Recovered",
            "Confirmed / M",
            "Deaths / M",
            "Days since lockdown",
            "Days since 50th death",
        ]);
        for r in &rows {
            t.push(vec![
                r.country().to_string(),
                r.date().to_string(),
                int_cell(r.enriched.row.confirmed),
                int_cell(r.enriched.row.deaths),
                int_cell(r.enriched.row.recovered),
                num_cell(Some(r.metrics.confirmed_per_million), config::SUMMARY_PRECISION),
                num_cell(Some(r.metrics.deaths_per_million), config::SUMMARY_PRECISION),
                int_cell(r.metrics.days_since_lockdown),
                int_cell(r.metrics.days_since_50th_death),
            ]);
        }
        push_table(doc, &t);

        let values = series.latest_values(&rank_by)?;
        self.chart(doc, out_dir, "latest_confirmed_per_million.svg", &rank_by.label(), values.is_empty(), |path| {
            charts::bar_chart(path, &rank_by.label(), "per million", &values, colors)
        })
    }

    fn recent_section(
        &self,
        doc: &mut String,
        tables: &TableQuery<'_>,
        series: &SeriesQuery<'_>,
        colors: &CountryColors,
        out_dir: &Path,
    ) -> Result<()> {
        let days = self.options.recent_days;
        doc.push_str(&format!("## Most recent {} days\n\n", days));
        let rank_by = MetricRequest::new(Metric::DailyConfirmed).rolling(true);
        let rows = tables.recent(days, &rank_by)?;

        let mut t = MarkdownTable::new(&[
            "Date",
            "Country",
            "Daily confirmed",
            "Confirmed 7-day avg",
            "Confirmed % change",
            "Daily deaths",
            "Deaths 7-day avg",
            "Deaths % change",
        ]);
        for r in &rows {
            let m = &r.metrics;
            t.push(vec![
                r.date().to_string(),
                r.country().to_string(),
                opt_int_cell(m.daily_confirmed),
                num_cell(m.daily_confirmed_avg7, config::TABLE_PRECISION),
                num_cell(m.confirmed_pct_change, 0),
                opt_int_cell(m.daily_deaths),
                num_cell(m.daily_deaths_avg7, config::TABLE_PRECISION),
                num_cell(m.deaths_pct_change, 0),
            ]);
        }
        push_table(doc, &t);

        let lines = series.series(&rank_by, Axis::Date)?;
        self.chart(doc, out_dir, "daily_confirmed_avg7.svg", &rank_by.label(), lines.is_empty(), |path| {
            charts::line_chart(path, &rank_by.label(), Axis::Date, "cases", &lines, colors)
        })
    }

    fn deaths_section(
        &self,
        doc: &mut String,
        tables: &TableQuery<'_>,
        series: &SeriesQuery<'_>,
        colors: &CountryColors,
        out_dir: &Path,
    ) -> Result<()> {
        let day = self.options.milestone_day;
        doc.push_str(&format!(
            "## Deaths per million, {} days after the 50th death\n\n",
            day
        ));
        let rank_by = MetricRequest::new(Metric::Deaths).per_population(true);
        let rows = tables.at_axis(Axis::DaysSince50thDeath, day, &rank_by)?;

        let mut t = MarkdownTable::new(&["Country", "Date", "Deaths", "Deaths / M"]);
        for r in &rows {
            t.push(vec![
                r.country().to_string(),
                r.date().to_string(),
                int_cell(r.enriched.row.deaths),
                num_cell(Some(r.metrics.deaths_per_million), config::SUMMARY_PRECISION),
            ]);
        }
        push_table(doc, &t);

        let lines = series.series(&rank_by, Axis::DaysSince50thDeath)?;
        let title = format!("{} by {}", rank_by.label(), Axis::DaysSince50thDeath.label());
        self.chart(doc, out_dir, "deaths_per_million_since_50th_death.svg", &title, lines.is_empty(), |path| {
            charts::line_chart(path, &title, Axis::DaysSince50thDeath, "per million", &lines, colors)
        })
    }

    fn lockdown_section(
        &self,
        doc: &mut String,
        series: &SeriesQuery<'_>,
        colors: &CountryColors,
        out_dir: &Path,
    ) -> Result<()> {
        doc.push_str("## Daily deaths after lockdown\n\n");
        let req = MetricRequest::new(Metric::DailyDeaths).rolling(true);
        let lines = series.series(&req, Axis::DaysSinceLockdown)?;
        let title = format!("{} by {}", req.label(), Axis::DaysSinceLockdown.label());
        self.chart(doc, out_dir, "daily_deaths_since_lockdown.svg", &title, lines.is_empty(), |path| {
            charts::faceted_line_chart(path, &title, Axis::DaysSinceLockdown, "deaths", &lines, colors)
        })
    }

    fn cycle_section(&self, doc: &mut String, series: &SeriesQuery<'_>) -> Result<()> {
        doc.push_str("## Reporting cycle\n\n");
        let req = MetricRequest::new(Metric::DailyConfirmed);
        let periods = series.dominant_periods(&req, &PeriodEstimator::default())?;
        let mut t = MarkdownTable::new(&["Country", "Dominant period (days)"]);
        for (country, period) in periods {
            t.push(vec![country, num_cell(period, 2)]);
        }
        push_table(doc, &t);
        Ok(())
    }

    /// Render one chart file and link it, or note that there is nothing to plot.
    fn chart<F>(
        &self,
        doc: &mut String,
        out_dir: &Path,
        file_name: &str,
        alt: &str,
        empty: bool,
        render: F,
    ) -> Result<()>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        if empty {
            warn!(chart = file_name, "nothing to plot");
            doc.push_str("_No data to plot._\n\n");
            return Ok(());
        }
        render(&out_dir.join(file_name))?;
        doc.push_str(&format!("![{}]({})\n\n", alt, file_name));
        Ok(())
    }
}

fn push_table(doc: &mut String, t: &MarkdownTable) {
    if t.is_empty() {
        doc.push_str("_No rows._\n\n");
    } else {
        doc.push_str(&t.render());
        doc.push('\n');
    }
}
