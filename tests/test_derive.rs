//! Derivation engine tests: deltas, rolling averages, percentage change,
//! per-million rates, days-since counters and series validation.

mod common;

use common::{date, enriched_series, start};
use covid_report::{DerivationEngine, Metric, MetricRequest, ReportError};

fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

// ---------------------------------------------------------------------------
// Daily deltas and rolling averages
// ---------------------------------------------------------------------------

#[test]
fn daily_and_rolling_from_a_single_jump() {
    let confirmed = [100, 100, 100, 100, 100, 100, 100, 200];
    let rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &confirmed, &[0; 8]);
    let derived = DerivationEngine::default().derive(rows).unwrap();

    let daily: Vec<Option<i64>> = derived.iter().map(|r| r.metrics.daily_confirmed).collect();
    assert_eq!(
        daily,
        vec![None, Some(0), Some(0), Some(0), Some(0), Some(0), Some(0), Some(100)]
    );

    // The first window still includes the undefined first delta.
    assert!(derived[..7].iter().all(|r| r.metrics.daily_confirmed_avg7.is_none()));
    let avg = derived[7].metrics.daily_confirmed_avg7.unwrap();
    assert!(approx(avg, 14.29, 0.005));
}

#[test]
fn delta_sums_back_to_the_cumulative_total() {
    let confirmed = [3, 7, 7, 12, 20, 21];
    let rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &confirmed, &[0; 6]);
    let derived = DerivationEngine::default().derive(rows).unwrap();

    let sum: i64 = derived.iter().filter_map(|r| r.metrics.daily_confirmed).sum();
    assert_eq!(sum, confirmed[5] - confirmed[0]);
}

#[test]
fn rolling_is_mean_of_trailing_window() {
    let confirmed: Vec<i64> = (0..20).map(|i| i * i).collect();
    let rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &confirmed, &[0; 20]);
    let derived = DerivationEngine::default().derive(rows).unwrap();

    for t in 7..20 {
        let window: Vec<f64> = derived[t - 6..=t]
            .iter()
            .map(|r| r.metrics.daily_confirmed.unwrap() as f64)
            .collect();
        let expected = window.iter().sum::<f64>() / 7.0;
        let got = derived[t].metrics.daily_confirmed_avg7.unwrap();
        assert!(approx(got, expected, 1e-9), "t={t}: {got} != {expected}");
    }
}

// ---------------------------------------------------------------------------
// Percentage change
// ---------------------------------------------------------------------------

#[test]
fn pct_change_reference_values() {
    let rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &[10, 20, 15], &[0, 0, 0]);
    let derived = DerivationEngine::default().derive(rows).unwrap();

    let pct: Vec<Option<f64>> = derived.iter().map(|r| r.metrics.confirmed_pct_change).collect();
    assert_eq!(pct, vec![None, Some(100.0), Some(-25.0)]);
    // Deaths stay at zero, so every change is undefined rather than an error.
    assert!(derived.iter().all(|r| r.metrics.deaths_pct_change.is_none()));
}

// ---------------------------------------------------------------------------
// Per-million rates
// ---------------------------------------------------------------------------

#[test]
fn per_million_rounds_to_two_places() {
    let rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &[1234, 5000], &[7, 8]);
    let derived = DerivationEngine::default().derive(rows).unwrap();

    assert_eq!(derived[0].metrics.confirmed_per_million, 229.8);
    assert_eq!(derived[0].metrics.deaths_per_million, 1.3);
    for r in &derived {
        let back = r.metrics.confirmed_per_million * 5.37;
        assert!(approx(back, r.enriched.row.confirmed as f64, 0.005 * 5.37 + 1e-9));
    }
}

#[test]
fn requests_apply_transforms_in_fixed_order() {
    let confirmed: Vec<i64> = (0..15).map(|i| 10 * i).collect();
    let rows = enriched_series("Norway", 2.0, date(2020, 3, 12), &confirmed, &[0; 15]);

    // Daily value is constant 10, so 5 per million, and the rolling mean of a
    // constant is the constant.
    let req = MetricRequest::new(Metric::DailyConfirmed)
        .per_population(true)
        .rolling(true);
    let values = req.evaluate(&rows);
    assert!(values[..7].iter().all(Option::is_none));
    assert!(values[7..].iter().all(|v| *v == Some(5.0)));

    // Percentage change of a constant is zero once defined.
    let pct = req.percentage(true).evaluate(&rows);
    assert!(pct[..8].iter().all(Option::is_none));
    assert!(pct[8..].iter().all(|v| *v == Some(0.0)));
}

// ---------------------------------------------------------------------------
// Days-since counters
// ---------------------------------------------------------------------------

#[test]
fn days_since_lockdown_starts_at_one_on_lockdown_day() {
    let lockdown = date(2020, 3, 5);
    let rows = enriched_series("Norway", 5.37, lockdown, &[1; 10], &[0; 10]);
    let derived = DerivationEngine::default().derive(rows).unwrap();

    for r in &derived {
        let expected = if r.date() < lockdown {
            0
        } else {
            (r.date() - lockdown).num_days() + 1
        };
        assert_eq!(r.metrics.days_since_lockdown, expected, "{}", r.date());
    }
    assert_eq!(derived[4].date(), lockdown);
    assert_eq!(derived[4].metrics.days_since_lockdown, 1);
}

#[test]
fn lockdown_before_series_counts_from_first_row() {
    let rows = enriched_series("Norway", 5.37, date(2020, 1, 1), &[1; 3], &[0; 3]);
    let derived = DerivationEngine::default().derive(rows).unwrap();
    let counters: Vec<i64> = derived.iter().map(|r| r.metrics.days_since_lockdown).collect();
    assert_eq!(counters, vec![1, 2, 3]);
}

#[test]
fn days_since_50th_death_counts_threshold_rows() {
    let deaths = [10, 30, 49, 50, 52, 60, 75];
    let rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &[0; 7], &deaths);
    let derived = DerivationEngine::default().derive(rows).unwrap();

    let counters: Vec<i64> = derived.iter().map(|r| r.metrics.days_since_50th_death).collect();
    assert_eq!(counters, vec![0, 0, 0, 1, 2, 3, 4]);
}

#[test]
fn custom_death_threshold() {
    let deaths = [0, 5, 10, 15];
    let rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &[0; 4], &deaths);
    let derived = DerivationEngine::new(10).derive(rows).unwrap();
    let counters: Vec<i64> = derived.iter().map(|r| r.metrics.days_since_50th_death).collect();
    assert_eq!(counters, vec![0, 0, 1, 2]);
}

// ---------------------------------------------------------------------------
// Country isolation
// ---------------------------------------------------------------------------

#[test]
fn countries_are_derived_independently() {
    let norway = enriched_series("Norway", 5.37, date(2020, 3, 12), &[1, 2, 3], &[0; 3]);
    let sweden = enriched_series("Sweden", 10.33, date(2020, 3, 29), &[100, 200, 400], &[0; 3]);

    let alone = DerivationEngine::default().derive(sweden.clone()).unwrap();
    let mut both_rows = norway;
    both_rows.extend(sweden);
    let both = DerivationEngine::default().derive(both_rows).unwrap();

    assert_eq!(both.len(), 6);
    // Sweden's first row has no delta even though Norway precedes it.
    assert_eq!(both[3].metrics.daily_confirmed, None);
    assert_eq!(&both[3..], &alone[..]);
}

#[test]
fn empty_input_derives_nothing() {
    assert!(DerivationEngine::default().derive(Vec::new()).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn gap_in_dates_is_rejected() {
    let mut rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &[1, 2, 3], &[0; 3]);
    rows[2].row.date = start() + chrono::Duration::days(5);
    let err = DerivationEngine::default().derive(rows).unwrap_err();
    assert!(matches!(err, ReportError::InvalidSeries { ref country, .. } if country == "Norway"));
}

#[test]
fn duplicate_date_is_rejected() {
    let mut rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &[1, 2, 3], &[0; 3]);
    rows[2].row.date = rows[1].row.date;
    let err = DerivationEngine::default().derive(rows).unwrap_err();
    match err {
        ReportError::InvalidSeries { reason, .. } => assert!(reason.contains("duplicate")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unsorted_dates_are_rejected() {
    let mut rows = enriched_series("Norway", 5.37, date(2020, 3, 12), &[1, 2, 3], &[0; 3]);
    rows.swap(0, 1);
    assert!(DerivationEngine::default().derive(rows).is_err());
}

#[test]
fn interleaved_countries_are_rejected() {
    let norway = enriched_series("Norway", 5.37, date(2020, 3, 12), &[1, 2], &[0; 2]);
    let sweden = enriched_series("Sweden", 10.33, date(2020, 3, 29), &[1, 2], &[0; 2]);
    let rows = vec![
        norway[0].clone(),
        sweden[0].clone(),
        norway[1].clone(),
        sweden[1].clone(),
    ];
    let err = DerivationEngine::default().derive(rows).unwrap_err();
    match err {
        ReportError::InvalidSeries { reason, .. } => assert!(reason.contains("contiguous")),
        other => panic!("unexpected error: {other}"),
    }
}
