//! Descriptive statistics over per-seed samples

use serde::Serialize;

use crate::core::error::{AnalysisError, Result};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum()
}

/// Standard deviation with divisor `n`
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (sum_sq_dev(values) / values.len() as f64).sqrt()
}

/// Standard deviation with divisor `n - 1`; zero for fewer than two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    (sum_sq_dev(values) / (values.len() - 1) as f64).sqrt()
}

/// Percentile `q` in [0, 100], interpolating linearly between closest ranks
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, q))
}

fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * q.clamp(0.0, 100.0) / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Mean, spread and 90% band of one metric across seeds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub p05: f64,
    pub p95: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(AnalysisError::EmptySample(
                "cannot summarise an empty sample".into(),
            ));
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            count: values.len(),
            mean: mean(values),
            std: population_std(values),
            p05: percentile_sorted(&sorted, 5.0),
            p95: percentile_sorted(&sorted, 95.0),
        })
    }

    /// `name: mean ± std  [p05, p95]`, aligned for console tables
    pub fn format_line(&self, name: &str, name_width: usize, precision: usize) -> String {
        format!(
            "{:<nw$}: {:>8.p$} ± {:>6.p$}  [{:>8.p$}, {:>8.p$}]",
            name,
            self.mean,
            self.std,
            self.p05,
            self.p95,
            nw = name_width,
            p = precision,
        )
    }

    /// `name: mean ± std` without the percentile band
    pub fn format_short(&self, name: &str, name_width: usize, precision: usize) -> String {
        format!(
            "{:<nw$}: {:>8.p$} ± {:>6.p$}",
            name,
            self.mean,
            self.std,
            nw = name_width,
            p = precision,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_population_vs_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx(mean(&values), 5.0));
        assert!(approx(population_std(&values), 2.0));
        assert!(approx(sample_std(&values), (32.0f64 / 7.0).sqrt()));
    }

    #[test]
    fn test_sample_std_single_value() {
        assert_eq!(sample_std(&[3.0]), 0.0);
        assert_eq!(population_std(&[]), 0.0);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        // Linear interpolation: q=5 gives 1.15, q=95 gives 3.85
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!(approx(percentile(&values, 5.0).unwrap(), 1.15));
        assert!(approx(percentile(&values, 95.0).unwrap(), 3.85));
        assert!(approx(percentile(&values, 50.0).unwrap(), 2.5));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_summary_of_constant_sample() {
        let summary = Summary::from_values(&[4756.0; 10]).unwrap();
        assert_eq!(summary.count, 10);
        assert_eq!(summary.mean, 4756.0);
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.p05, 4756.0);
        assert_eq!(summary.p95, 4756.0);
    }

    #[test]
    fn test_summary_rejects_empty() {
        assert!(matches!(
            Summary::from_values(&[]),
            Err(AnalysisError::EmptySample(_))
        ));
    }

    #[test]
    fn test_format_line_layout() {
        let summary = Summary::from_values(&[1.0, 3.0]).unwrap();
        let line = summary.format_line("Gini", 6, 1);
        assert_eq!(line, "Gini  :      2.0 ±    1.0  [     1.1,      2.9]");
    }
}
