//! One-dimensional Gaussian mixtures fitted by expectation-maximisation
//!
//! Used to decide whether the adoption outcomes of a scenario are better
//! described by one regime or several. Model size is chosen by BIC.

use std::f64::consts::PI;

use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::BimodalityConfig;
use crate::core::error::{AnalysisError, Result};
use crate::stats::summary::{mean, population_std};

/// EM settings
#[derive(Debug, Clone)]
pub struct GmmOptions {
    /// Independent restarts; the fit with the best likelihood is kept
    pub n_init: usize,
    pub seed: u64,
    pub max_iter: usize,
    /// Convergence threshold on the change of mean log-likelihood
    pub tol: f64,
    /// Added to every variance so collapsed components stay finite
    pub reg_covar: f64,
}

impl Default for GmmOptions {
    fn default() -> Self {
        Self {
            n_init: 10,
            seed: 42,
            max_iter: 100,
            tol: 1e-3,
            reg_covar: 1e-6,
        }
    }
}

impl From<&BimodalityConfig> for GmmOptions {
    fn from(config: &BimodalityConfig) -> Self {
        Self {
            n_init: config.n_init,
            seed: config.seed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaussianComponent {
    pub weight: f64,
    pub mean: f64,
    pub variance: f64,
}

impl GaussianComponent {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    fn log_weighted_density(&self, x: f64) -> f64 {
        let d = x - self.mean;
        self.weight.ln() - 0.5 * ((2.0 * PI * self.variance).ln() + d * d / self.variance)
    }

    /// Weighted density at `x`
    pub fn weighted_pdf(&self, x: f64) -> f64 {
        self.log_weighted_density(x).exp()
    }
}

/// A fitted mixture, components ordered by mean
#[derive(Debug, Clone, Serialize)]
pub struct GaussianMixture {
    pub components: Vec<GaussianComponent>,
    /// Mean log-likelihood per sample
    pub log_likelihood: f64,
    pub n_samples: usize,
    pub converged: bool,
    pub iterations: usize,
}

impl GaussianMixture {
    /// Fit `k` components to `values`
    pub fn fit(values: &[f64], k: usize, options: &GmmOptions) -> Result<Self> {
        if values.is_empty() {
            return Err(AnalysisError::EmptySample(
                "cannot fit a mixture to an empty sample".into(),
            ));
        }
        if k == 0 || values.len() < k {
            return Err(AnalysisError::InsufficientData {
                needed: k.max(1),
                got: values.len(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        let mut best: Option<GaussianMixture> = None;

        for _ in 0..options.n_init.max(1) {
            let start = sample(&mut rng, values.len(), k).into_vec();
            let fit = run_em(values, &start, options);
            let better = best
                .as_ref()
                .map_or(true, |b| fit.log_likelihood > b.log_likelihood);
            if better {
                best = Some(fit);
            }
        }

        // n_init >= 1, so at least one fit exists
        let mut best = best.ok_or_else(|| AnalysisError::InsufficientData {
            needed: 1,
            got: 0,
        })?;
        best.components.sort_by(|a, b| a.mean.total_cmp(&b.mean));

        if !best.converged {
            tracing::warn!(
                "GMM k={} did not converge after {} iterations",
                k,
                best.iterations
            );
        }

        Ok(best)
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Free parameters: means, variances and all but one weight
    pub fn n_parameters(&self) -> usize {
        3 * self.components.len() - 1
    }

    /// Bayesian information criterion (lower is better)
    pub fn bic(&self) -> f64 {
        let n = self.n_samples as f64;
        -2.0 * self.log_likelihood * n + self.n_parameters() as f64 * n.ln()
    }

    pub fn pdf(&self, x: f64) -> f64 {
        self.components.iter().map(|c| c.weighted_pdf(x)).sum()
    }
}

fn log_sum_exp(terms: &[f64]) -> f64 {
    let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + terms.iter().map(|t| (t - max).exp()).sum::<f64>().ln()
}

/// E-step: responsibilities (rows = samples) and mean log-likelihood
fn expectation(values: &[f64], components: &[GaussianComponent]) -> (Vec<Vec<f64>>, f64) {
    let mut total = 0.0;
    let mut terms = vec![0.0; components.len()];
    let resp: Vec<Vec<f64>> = values
        .iter()
        .map(|&x| {
            for (t, c) in terms.iter_mut().zip(components) {
                *t = c.log_weighted_density(x);
            }
            let lse = log_sum_exp(&terms);
            total += lse;
            terms.iter().map(|t| (t - lse).exp()).collect::<Vec<f64>>()
        })
        .collect();
    (resp, total / values.len() as f64)
}

/// M-step: re-estimate every component from the responsibilities
fn maximization(
    values: &[f64],
    resp: &[Vec<f64>],
    k: usize,
    reg_covar: f64,
) -> Vec<GaussianComponent> {
    let n = values.len() as f64;
    (0..k)
        .map(|j| {
            let nk = resp.iter().map(|r| r[j]).sum::<f64>() + 10.0 * f64::EPSILON;
            let mu = values.iter().zip(resp).map(|(x, r)| r[j] * x).sum::<f64>() / nk;
            let var = values
                .iter()
                .zip(resp)
                .map(|(x, r)| r[j] * (x - mu) * (x - mu))
                .sum::<f64>()
                / nk
                + reg_covar;
            GaussianComponent {
                weight: nk / n,
                mean: mu,
                variance: var,
            }
        })
        .collect()
}

fn run_em(values: &[f64], start: &[usize], options: &GmmOptions) -> GaussianMixture {
    let k = start.len();
    let spread = population_std(values);
    let initial_var = spread * spread + options.reg_covar;

    let mut components: Vec<GaussianComponent> = start
        .iter()
        .map(|&i| GaussianComponent {
            weight: 1.0 / k as f64,
            mean: values[i],
            variance: initial_var,
        })
        .collect();

    // One component starts at the sample mean
    if k == 1 {
        components[0].mean = mean(values);
    }

    let mut prev = f64::NEG_INFINITY;
    let mut converged = false;
    let mut iterations = 0;

    for iter in 1..=options.max_iter {
        iterations = iter;
        let (resp, ll) = expectation(values, &components);
        if (ll - prev).abs() < options.tol {
            converged = true;
            break;
        }
        prev = ll;
        components = maximization(values, &resp, k, options.reg_covar);
    }

    let (_, log_likelihood) = expectation(values, &components);

    GaussianMixture {
        components,
        log_likelihood,
        n_samples: values.len(),
        converged,
        iterations,
    }
}

/// BIC of every mixture size and the winning fit
#[derive(Debug, Clone, Serialize)]
pub struct ModelSelection {
    /// `(k, bic)` for k = 1..=max
    pub bics: Vec<(usize, f64)>,
    pub best: GaussianMixture,
}

impl ModelSelection {
    pub fn best_k(&self) -> usize {
        self.best.n_components()
    }
}

/// Fit 1..=max_components mixtures and keep the lowest BIC
pub fn select_components(
    values: &[f64],
    max_components: usize,
    options: &GmmOptions,
) -> Result<ModelSelection> {
    let max_k = max_components.min(values.len());
    let mut bics = Vec::with_capacity(max_k);
    let mut best: Option<GaussianMixture> = None;

    for k in 1..=max_k {
        let fit = GaussianMixture::fit(values, k, options)?;
        let bic = fit.bic();
        tracing::debug!("GMM k={}: BIC={:.1}", k, bic);
        bics.push((k, bic));

        if best.as_ref().map_or(true, |b| bic < b.bic()) {
            best = Some(fit);
        }
    }

    let best = best.ok_or_else(|| AnalysisError::InsufficientData {
        needed: 1,
        got: values.len(),
    })?;

    Ok(ModelSelection { bics, best })
}
