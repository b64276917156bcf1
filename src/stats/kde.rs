//! Gaussian kernel density estimate with Scott's bandwidth

use std::f64::consts::PI;

use crate::core::error::{AnalysisError, Result};
use crate::stats::summary::sample_std;

/// `n` evenly spaced points from `start` to `stop` inclusive
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

#[derive(Debug, Clone)]
pub struct GaussianKde {
    points: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Kernel width is the sample std scaled by `n^(-1/5)`
    pub fn new(values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                needed: 2,
                got: values.len(),
            });
        }

        let bandwidth = sample_std(values) * (values.len() as f64).powf(-0.2);
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return Err(AnalysisError::DegenerateSample(format!(
                "{} values without spread",
                values.len()
            )));
        }

        Ok(Self {
            points: values.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let norm = self.points.len() as f64 * self.bandwidth * (2.0 * PI).sqrt();
        self.points
            .iter()
            .map(|p| {
                let z = (x - p) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            / norm
    }

    pub fn evaluate(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|&x| self.density(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_scott_bandwidth() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let kde = GaussianKde::new(&values).unwrap();
        let expected = sample_std(&values) * 5f64.powf(-0.2);
        assert!((kde.bandwidth() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let values = [28.0, 31.0, 33.0, 70.0, 72.0, 75.0];
        let kde = GaussianKde::new(&values).unwrap();
        let grid = linspace(-100.0, 200.0, 3001);
        let dx = grid[1] - grid[0];
        let area: f64 = kde.evaluate(&grid).iter().sum::<f64>() * dx;
        assert!((area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_density_is_symmetric_around_single_cluster() {
        let kde = GaussianKde::new(&[-1.0, 1.0]).unwrap();
        assert!((kde.density(0.5) - kde.density(-0.5)).abs() < 1e-15);
        assert!(kde.density(0.0) > kde.density(5.0));
    }

    #[test]
    fn test_degenerate_samples_rejected() {
        assert!(matches!(
            GaussianKde::new(&[1.0]),
            Err(AnalysisError::InsufficientData { needed: 2, got: 1 })
        ));
        assert!(matches!(
            GaussianKde::new(&[2.0, 2.0, 2.0]),
            Err(AnalysisError::DegenerateSample(_))
        ));
    }
}
