//! Attractor split of adoption outcomes
//!
//! Seeds of a bistable scenario end up near one of two adoption levels.
//! Splitting at a fixed threshold gives the size and location of each.

use std::fmt;

use serde::Serialize;

use crate::core::error::{AnalysisError, Result};
use crate::stats::summary::{mean, population_std};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterStats {
    pub count: usize,
    /// Share of all seeds, in percent
    pub share_pct: f64,
    /// `None` when the cluster is empty
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

impl ClusterStats {
    fn from_values(values: &[f64], total: usize) -> Self {
        let (mean, std) = if values.is_empty() {
            (None, None)
        } else {
            (Some(mean(values)), Some(population_std(values)))
        };
        Self {
            count: values.len(),
            share_pct: values.len() as f64 / total as f64 * 100.0,
            mean,
            std,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttractorSplit {
    pub threshold: f64,
    /// Values strictly above the threshold
    pub high: ClusterStats,
    /// Values at or below the threshold
    pub low: ClusterStats,
}

/// Partition adoption values (in percent) at `threshold`
pub fn split_at_threshold(values: &[f64], threshold: f64) -> Result<AttractorSplit> {
    if values.is_empty() {
        return Err(AnalysisError::EmptySample(
            "no adoption values to split".into(),
        ));
    }

    let (high, low): (Vec<f64>, Vec<f64>) = values.iter().partition(|&&v| v > threshold);

    Ok(AttractorSplit {
        threshold,
        high: ClusterStats::from_values(&high, values.len()),
        low: ClusterStats::from_values(&low, values.len()),
    })
}

fn write_cluster(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    relation: &str,
    threshold: f64,
    cluster: &ClusterStats,
) -> fmt::Result {
    writeln!(
        f,
        "  Seeds in {} attractor ({}{}%): {} ({:.0}%)",
        name, relation, threshold, cluster.count, cluster.share_pct
    )?;
    match (cluster.mean, cluster.std) {
        (Some(m), Some(s)) => writeln!(f, "    Mean: {:.1}% ± {:.1}%", m, s),
        _ => writeln!(f, "    Mean: n/a"),
    }
}

impl fmt::Display for AttractorSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_cluster(f, "HIGH", ">", self.threshold, &self.high)?;
        write_cluster(f, "LOW", "≤", self.threshold, &self.low)
    }
}
