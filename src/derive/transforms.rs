//! Series-level primitives: lag delta, percentage change, trailing rolling
//! mean, per-population scaling and flag counters.
//!
//! Every function works on one country's date-ordered series. `None` is an
//! undefined value and propagates instead of raising.

/// One value per row of a country's series.
pub type Series = Vec<Option<f64>>;

/// `raw[t] - raw[t-1]`; undefined on the first day.
pub fn daily_delta(raw: &[i64]) -> Vec<Option<i64>> {
    let mut out = Vec::with_capacity(raw.len());
    for (i, value) in raw.iter().enumerate() {
        if i == 0 {
            out.push(None);
        } else {
            out.push(Some(value - raw[i - 1]));
        }
    }
    out
}

/// Day-over-day change in whole percent: `round((cur - prev) / prev, 2) * 100`.
///
/// Undefined on the first day, when either side is undefined, or when the
/// previous value is zero.
pub fn pct_change(values: &[Option<f64>]) -> Series {
    let mut out = Vec::with_capacity(values.len());
    for (i, cur) in values.iter().enumerate() {
        let prev = if i == 0 { None } else { values[i - 1] };
        let change = match (prev, *cur) {
            (Some(p), Some(c)) if p != 0.0 => {
                // Same value as rounding the ratio to 2 places then scaling,
                // without the float noise of the second multiplication.
                Some(((c - p) / p * 100.0).round())
            }
            _ => None,
        };
        out.push(change.filter(|v| v.is_finite()));
    }
    out
}

/// Trailing, right-aligned mean over `window` values.
///
/// Undefined for the first `window - 1` positions and for any window that
/// contains an undefined value.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Series {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i + 1 < window {
            out.push(None);
            continue;
        }
        let slice = &values[i + 1 - window..=i];
        let sum: Option<f64> = slice.iter().copied().sum();
        out.push(sum.map(|s| s / window as f64));
    }
    out
}

/// Divide by population (millions) and round to `precision` decimals.
pub fn per_population(values: &[Option<f64>], population: f64, precision: u32) -> Series {
    values
        .iter()
        .map(|v| {
            v.map(|x| x / population)
                .filter(|x| x.is_finite())
                .map(|x| round_to(x, precision))
        })
        .collect()
}

/// Running count of `true` flags: 0 before the first, +1 on every flagged row.
pub fn cumulative_count(flags: &[bool]) -> Vec<i64> {
    flags
        .iter()
        .scan(0i64, |acc, &flag| {
            if flag {
                *acc += 1;
            }
            Some(*acc)
        })
        .collect()
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Lift integer counts into a series.
pub fn from_counts(values: &[i64]) -> Series {
    values.iter().map(|&v| Some(v as f64)).collect()
}

/// Lift optional integer values (e.g. daily deltas) into a series.
pub fn from_optional_counts(values: &[Option<i64>]) -> Series {
    values.iter().map(|v| v.map(|x| x as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn delta_has_one_fewer_defined_value() {
        let d = daily_delta(&[1, 4, 9, 16]);
        assert_eq!(d, vec![None, Some(3), Some(5), Some(7)]);
        assert_eq!(d.iter().flatten().count(), 3);
        assert!(daily_delta(&[]).is_empty());
    }

    #[test]
    fn pct_change_matches_reference_values() {
        let s = pct_change(&from_counts(&[10, 20, 15]));
        assert_eq!(s, vec![None, Some(100.0), Some(-25.0)]);
    }

    #[test]
    fn pct_change_from_zero_is_undefined() {
        let s = pct_change(&[Some(0.0), Some(5.0), None, Some(4.0)]);
        assert_eq!(s, vec![None, None, None, None]);
    }

    #[test]
    fn rolling_mean_of_constant_series() {
        let s = rolling_mean(&from_counts(&[3; 10]), 7);
        assert!(s[..6].iter().all(Option::is_none));
        assert!(s[6..].iter().all(|v| v.map(|x| approx(x, 3.0)).unwrap_or(false)));
    }

    #[test]
    fn rolling_mean_skips_windows_with_gaps() {
        let s = rolling_mean(&[None, Some(1.0), Some(2.0), Some(3.0)], 2);
        assert_eq!(s, vec![None, None, Some(1.5), Some(2.5)]);
    }

    #[test]
    fn per_population_rounds_and_round_trips() {
        let raw = [1234, 5, 0];
        let s = per_population(&from_counts(&raw), 5.37, 2);
        for (r, n) in raw.iter().zip(&s) {
            let n = n.unwrap();
            assert!((n * 5.37 - *r as f64).abs() <= 0.005 * 5.37 + 1e-9);
        }
        assert_eq!(s[0], Some(229.8));
    }

    #[test]
    fn cumulative_count_never_decreases() {
        let c = cumulative_count(&[false, false, true, true, false, true]);
        assert_eq!(c, vec![0, 0, 1, 2, 2, 3]);
    }
}
