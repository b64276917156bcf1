//! BDP sweep: terminal outcomes across a grid of transfer levels
//!
//! Each level has its own terminal file. The spread of adoption across
//! seeds peaks where the system is closest to a bifurcation, so the level
//! with the largest standard deviation is reported as the critical point.

use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::core::config::SweepConfig;
use crate::core::error::Result;
use crate::data::terminal::{
    TerminalTable, COL_INFLATION, COL_TOTAL_ADOPTION, COL_UNEMPLOYMENT,
};
use crate::stats::summary::{mean, sample_std};

/// File holding the terminal data of one sweep level
pub fn level_path(dir: &Path, bdp: u32) -> PathBuf {
    dir.join(format!("sweep_{}_terminal.csv", bdp))
}

/// Per-seed outcomes at one transfer level, all in percent
#[derive(Debug, Clone, Serialize)]
pub struct SweepLevel {
    pub bdp: u32,
    pub adoption: Vec<f64>,
    pub inflation: Vec<f64>,
    pub unemployment: Vec<f64>,
}

impl SweepLevel {
    pub fn from_table(bdp: u32, table: &TerminalTable) -> Result<Self> {
        Ok(Self {
            bdp,
            adoption: table.scaled_column(COL_TOTAL_ADOPTION, 100.0)?,
            inflation: table.scaled_column(COL_INFLATION, 100.0)?,
            unemployment: table.scaled_column(COL_UNEMPLOYMENT, 100.0)?,
        })
    }

    pub fn seeds(&self) -> usize {
        self.adoption.len()
    }

    pub fn stats(&self) -> SweepLevelStats {
        SweepLevelStats {
            bdp: self.bdp,
            seeds: self.seeds(),
            adoption_mean: mean(&self.adoption),
            adoption_std: sample_std(&self.adoption),
            inflation_mean: mean(&self.inflation),
            inflation_std: sample_std(&self.inflation),
            unemployment_mean: mean(&self.unemployment),
            unemployment_std: sample_std(&self.unemployment),
        }
    }
}

/// Means and sample standard deviations of one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepLevelStats {
    pub bdp: u32,
    pub seeds: usize,
    pub adoption_mean: f64,
    pub adoption_std: f64,
    pub inflation_mean: f64,
    pub inflation_std: f64,
    pub unemployment_mean: f64,
    pub unemployment_std: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepAnalysis {
    /// Loaded levels in ascending transfer order
    pub levels: Vec<SweepLevel>,
    /// Levels of the grid with no file on disk
    pub missing: Vec<u32>,
}

impl SweepAnalysis {
    /// Load every level of the grid; absent files are skipped
    pub fn load(config: &SweepConfig) -> Result<Self> {
        let loaded: Vec<(u32, Option<SweepLevel>)> = config
            .levels()
            .into_par_iter()
            .map(|bdp| {
                let path = level_path(&config.dir, bdp);
                if !path.exists() {
                    return Ok((bdp, None));
                }
                let table = TerminalTable::load(&path)?;
                Ok((bdp, Some(SweepLevel::from_table(bdp, &table)?)))
            })
            .collect::<Result<_>>()?;

        let mut levels = Vec::new();
        let mut missing = Vec::new();
        for (bdp, level) in loaded {
            match level {
                Some(level) => {
                    let s = level.stats();
                    tracing::info!(
                        "BDP={:5}: {} seeds, Adopt={:.1}±{:.1}%",
                        bdp,
                        s.seeds,
                        s.adoption_mean,
                        s.adoption_std
                    );
                    levels.push(level);
                }
                None => {
                    tracing::warn!("MISSING: {}", level_path(&config.dir, bdp).display());
                    missing.push(bdp);
                }
            }
        }

        Ok(Self::from_levels(levels, missing))
    }

    pub fn from_levels(mut levels: Vec<SweepLevel>, missing: Vec<u32>) -> Self {
        levels.sort_by_key(|l| l.bdp);
        Self { levels, missing }
    }

    /// Total number of (level, seed) points
    pub fn total_points(&self) -> usize {
        self.levels.iter().map(SweepLevel::seeds).sum()
    }

    pub fn stats(&self) -> Vec<SweepLevelStats> {
        self.levels
            .iter()
            .filter(|l| l.seeds() > 0)
            .map(SweepLevel::stats)
            .collect()
    }

    /// Level with the largest adoption spread; the first one wins ties
    pub fn critical_point(&self) -> Option<SweepLevelStats> {
        self.stats().into_iter().fold(None, |best, s| match best {
            Some(b) if b.adoption_std >= s.adoption_std => Some(b),
            _ => Some(s),
        })
    }
}

impl fmt::Display for SweepAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(80))?;
        writeln!(f, "BDP SWEEP SUMMARY")?;
        writeln!(f, "{}", "=".repeat(80))?;
        writeln!(
            f,
            "{:>6} | {:>8} {:>6} | {:>8} {:>6} | {:>8} {:>6} | {:>8}",
            "BDP", "Adopt μ", "±σ", "Infl μ", "±σ", "Unemp μ", "±σ", "σ_adopt"
        )?;
        writeln!(f, "{}", "-".repeat(80))?;
        for s in self.stats() {
            writeln!(
                f,
                "{:6} | {:8.1} {:6.1} | {:8.1} {:6.1} | {:8.1} {:6.1} | {:8.1}",
                s.bdp,
                s.adoption_mean,
                s.adoption_std,
                s.inflation_mean,
                s.inflation_std,
                s.unemployment_mean,
                s.unemployment_std,
                s.adoption_std
            )?;
        }

        if let Some(c) = self.critical_point() {
            writeln!(f, "\nCritical point (max σ): BDP = {} PLN", c.bdp)?;
            writeln!(f, "  σ_adoption at critical point: {:.1}%", c.adoption_std)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(bdp: u32, adoption: &[f64]) -> SweepLevel {
        SweepLevel {
            bdp,
            adoption: adoption.to_vec(),
            inflation: vec![2.0; adoption.len()],
            unemployment: vec![5.0; adoption.len()],
        }
    }

    #[test]
    fn test_critical_point_is_max_spread() {
        let analysis = SweepAnalysis::from_levels(
            vec![
                level(2000, &[20.0, 80.0, 25.0, 75.0]),
                level(0, &[30.0, 31.0, 29.0]),
                level(4000, &[60.0, 64.0]),
            ],
            vec![],
        );

        assert_eq!(analysis.levels[0].bdp, 0);
        assert_eq!(analysis.total_points(), 9);
        assert_eq!(analysis.critical_point().unwrap().bdp, 2000);
    }

    #[test]
    fn test_ties_keep_lowest_level() {
        let analysis = SweepAnalysis::from_levels(
            vec![level(250, &[1.0, 3.0]), level(500, &[5.0, 7.0])],
            vec![],
        );
        assert_eq!(analysis.critical_point().unwrap().bdp, 250);
    }

    #[test]
    fn test_level_stats_use_sample_std() {
        let s = level(0, &[1.0, 3.0]).stats();
        assert_eq!(s.adoption_mean, 2.0);
        assert!((s.adoption_std - 2.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.inflation_std, 0.0);
    }

    #[test]
    fn test_summary_table() {
        let analysis = SweepAnalysis::from_levels(vec![level(250, &[40.0, 60.0])], vec![0]);
        let text = analysis.to_string();
        assert!(text.contains("BDP SWEEP SUMMARY"));
        assert!(text.contains("   250 |     50.0   14.1 |      2.0    0.0 |      5.0    0.0 |     14.1"));
        assert!(text.contains("Critical point (max σ): BDP = 250 PLN"));
    }

    #[test]
    fn test_empty_analysis_has_no_critical_point() {
        let analysis = SweepAnalysis::from_levels(vec![], vec![0, 250]);
        assert!(analysis.critical_point().is_none());
        assert_eq!(analysis.total_points(), 0);
    }

    #[test]
    fn test_level_path() {
        assert_eq!(
            level_path(Path::new("results/sweep"), 1250),
            PathBuf::from("results/sweep/sweep_1250_terminal.csv")
        );
    }
}
