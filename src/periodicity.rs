//! Dominant reporting-cycle detection via periodogram peak picking.
//!
//! Daily case counts carry a strong weekly pattern (fewer reports over the
//! weekend, catch-up on Monday). The estimator finds that cycle as the
//! lowest-frequency spectral peak above a small frequency cutoff.

use std::f64::consts::PI;

use crate::config;
use crate::derive::transforms::round_to;

/// A local maximum of the power spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Cycles per sample.
    pub frequency: f64,
    pub density: f64,
}

impl SpectralPeak {
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }
}

/// Estimates the dominant period of a daily series.
#[derive(Debug, Clone)]
pub struct PeriodEstimator {
    /// Peaks at or below this frequency are ignored.
    pub frequency_cutoff: f64,
    /// Fewer peaks than this above the threshold means no usable cycle.
    pub min_peaks: usize,
}

impl Default for PeriodEstimator {
    fn default() -> Self {
        Self {
            frequency_cutoff: config::FREQUENCY_CUTOFF,
            min_peaks: 3,
        }
    }
}

impl PeriodEstimator {
    /// Period in samples (days), rounded to 2 decimals, or `None` when the
    /// spectrum has no usable peak.
    pub fn dominant_period(&self, series: &[Option<f64>]) -> Option<f64> {
        let values: Vec<f64> = series
            .iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect();
        let spectrum = periodogram(&values);
        if spectrum.is_empty() {
            return None;
        }
        let threshold = spectrum.iter().map(|(_, p)| p).sum::<f64>() / spectrum.len() as f64;
        let peaks = spectral_peaks(&spectrum, threshold);
        if peaks.len() < self.min_peaks {
            return None;
        }
        peaks
            .iter()
            .filter(|p| p.frequency > self.frequency_cutoff)
            .min_by(|a, b| a.frequency.total_cmp(&b.frequency))
            .map(|p| round_to(p.period(), 2))
    }
}

/// One-sided power spectral density of a mean-detrended series, sampled at
/// `k / n` cycles per sample for `k = 0..=n/2`.
///
/// Returns `(frequency, density)` pairs. Series shorter than 3 samples have
/// no meaningful spectrum and yield an empty vector.
pub fn periodogram(values: &[f64]) -> Vec<(f64, f64)> {
    let n = values.len();
    if n < 3 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();

    (0..=n / 2)
        .map(|k| {
            let (mut re, mut im) = (0.0, 0.0);
            for (t, x) in centered.iter().enumerate() {
                let angle = 2.0 * PI * (k * t % n) as f64 / n as f64;
                re += x * angle.cos();
                im -= x * angle.sin();
            }
            let mut density = (re * re + im * im) / n as f64;
            // Fold negative frequencies in, except for DC and Nyquist.
            let nyquist = n % 2 == 0 && k == n / 2;
            if k != 0 && !nyquist {
                density *= 2.0;
            }
            (k as f64 / n as f64, density)
        })
        .collect()
}

/// Interior local maxima with density above `threshold`, in frequency order.
pub fn spectral_peaks(spectrum: &[(f64, f64)], threshold: f64) -> Vec<SpectralPeak> {
    spectrum
        .windows(3)
        .filter_map(|w| {
            let (left, mid, right) = (w[0].1, w[1], w[2].1);
            (mid.1 > left && mid.1 >= right && mid.1 > threshold).then_some(SpectralPeak {
                frequency: mid.0,
                density: mid.1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly_spikes(days: usize) -> Vec<Option<f64>> {
        (0..days)
            .map(|t| Some(if t % 7 == 0 { 500.0 } else { 100.0 }))
            .collect()
    }

    #[test]
    fn finds_weekly_cycle() {
        let period = PeriodEstimator::default().dominant_period(&weekly_spikes(140));
        assert_eq!(period, Some(7.0));
    }

    #[test]
    fn missing_values_count_as_zero() {
        let mut series = weekly_spikes(140);
        series[3] = None;
        series[4] = Some(f64::NAN);
        assert_eq!(PeriodEstimator::default().dominant_period(&series), Some(7.0));
    }

    #[test]
    fn pure_tone_has_too_few_peaks() {
        let series: Vec<Option<f64>> = (0..140)
            .map(|t| Some((2.0 * PI * t as f64 / 7.0).sin()))
            .collect();
        assert_eq!(PeriodEstimator::default().dominant_period(&series), None);
    }

    #[test]
    fn degenerate_inputs_are_undefined() {
        let est = PeriodEstimator::default();
        assert_eq!(est.dominant_period(&[]), None);
        assert_eq!(est.dominant_period(&[Some(1.0), Some(2.0)]), None);
        assert_eq!(est.dominant_period(&vec![Some(5.0); 30]), None);
    }

    #[test]
    fn periodogram_covers_half_spectrum() {
        let spectrum = periodogram(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(spectrum.len(), 4);
        assert_eq!(spectrum[0].0, 0.0);
        assert!((spectrum[3].0 - 0.5).abs() < 1e-12);
        // Mean removed, so no power at DC.
        assert!(spectrum[0].1.abs() < 1e-9);
    }
}
