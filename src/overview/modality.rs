//! Bimodality diagnostics of technology adoption

use std::fmt;

use serde::Serialize;

use crate::core::config::BimodalityConfig;
use crate::core::error::Result;
use crate::data::terminal::{TerminalTable, COL_TOTAL_ADOPTION};
use crate::stats::bimodality::{split_at_threshold, AttractorSplit};
use crate::stats::gmm::{select_components, GmmOptions, ModelSelection};

#[derive(Debug, Clone, Serialize)]
pub struct ModalityReport {
    pub label: String,
    pub n_seeds: usize,
    /// Adoption per seed (%)
    pub values: Vec<f64>,
    pub split: AttractorSplit,
    pub selection: ModelSelection,
}

impl ModalityReport {
    /// Adoption values (percent) of one scenario, split and mixture-fitted
    pub fn from_table(
        label: &str,
        table: &TerminalTable,
        config: &BimodalityConfig,
    ) -> Result<Self> {
        let adoption = table.scaled_column(COL_TOTAL_ADOPTION, 100.0)?;
        Self::from_values(label, &adoption, config)
    }

    pub fn from_values(
        label: &str,
        adoption_pct: &[f64],
        config: &BimodalityConfig,
    ) -> Result<Self> {
        let split = split_at_threshold(adoption_pct, config.threshold)?;
        let selection = select_components(
            adoption_pct,
            config.max_components,
            &GmmOptions::from(config),
        )?;

        tracing::info!(
            "{}: best mixture has {} component(s)",
            label,
            selection.best_k()
        );

        Ok(Self {
            label: label.to_string(),
            n_seeds: adoption_pct.len(),
            values: adoption_pct.to_vec(),
            split,
            selection,
        })
    }
}

impl ModalityReport {
    /// BIC of the one-component fit
    pub fn unimodal_bic(&self) -> Option<f64> {
        self.selection
            .bics
            .iter()
            .find(|&&(k, _)| k == 1)
            .map(|&(_, bic)| bic)
    }

    pub fn best_bic(&self) -> f64 {
        self.selection.best.bic()
    }
}

impl fmt::Display for ModalityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(
            f,
            "BIMODALITY ANALYSIS: {} (N={})",
            self.label, self.n_seeds
        )?;
        writeln!(f, "{}", "=".repeat(60))?;

        writeln!(f, "\n1. ATTRACTOR SPLIT")?;
        write!(f, "{}", self.split)?;

        writeln!(f, "\n2. GAUSSIAN MIXTURE MODEL (BIC)")?;
        let best_k = self.selection.best_k();
        for &(k, bic) in &self.selection.bics {
            let tag = if k == best_k && k > 1 { " <-- BEST" } else { "" };
            writeln!(f, "   K={}: BIC={:8.1}{}", k, bic, tag)?;
        }
        writeln!(f, "\n   Best model: K={}", best_k)?;

        writeln!(f, "\n3. MIXTURE PARAMETERS (K={}):", best_k)?;
        for (j, c) in self.selection.best.components.iter().enumerate() {
            writeln!(
                f,
                "   Component {}: mu={:.1}%, sigma={:.1}%, weight={:.2}",
                j + 1,
                c.mean,
                c.std_dev(),
                c.weight
            )?;
        }
        Ok(())
    }
}

/// One scenario's line in the cross-scenario contrast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalityContrastRow {
    pub label: String,
    pub n_seeds: usize,
    pub best_k: usize,
    pub bic_unimodal: f64,
    pub bic_best: f64,
    /// Share of seeds above the attractor threshold (%)
    pub high_share_pct: f64,
}

impl ModalityContrastRow {
    /// BIC gained by the best mixture over a single Gaussian
    pub fn bic_gain(&self) -> f64 {
        self.bic_unimodal - self.bic_best
    }
}

/// Mixture selection of every scenario side by side
#[derive(Debug, Clone, Serialize)]
pub struct ModalityContrast {
    pub threshold: f64,
    pub rows: Vec<ModalityContrastRow>,
}

impl ModalityContrast {
    pub fn from_reports(threshold: f64, reports: &[ModalityReport]) -> Self {
        let rows = reports
            .iter()
            .map(|r| {
                let bic_best = r.best_bic();
                ModalityContrastRow {
                    label: r.label.clone(),
                    n_seeds: r.n_seeds,
                    best_k: r.selection.best_k(),
                    bic_unimodal: r.unimodal_bic().unwrap_or(bic_best),
                    bic_best,
                    high_share_pct: r.split.high.share_pct,
                }
            })
            .collect();
        Self { threshold, rows }
    }

    /// Labels of scenarios where more than one regime wins
    pub fn multimodal(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.best_k > 1)
            .map(|r| r.label.as_str())
            .collect()
    }
}

impl fmt::Display for ModalityContrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n4. CROSS-SCENARIO CONTRAST:")?;
        for r in &self.rows {
            let verdict = if r.best_k > 1 { "multimodal" } else { "unimodal" };
            writeln!(
                f,
                "   {:12}: K={}, ΔBIC={:7.1}, >{}%: {:3.0}% [{}]",
                r.label,
                r.best_k,
                r.bic_gain(),
                self.threshold,
                r.high_share_pct,
                verdict
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_on_two_clusters() {
        let mut values: Vec<f64> = (0..40).map(|i| 30.0 + (i % 8) as f64 * 0.7 - 2.45).collect();
        values.extend((0..40).map(|i| 72.0 + (i % 9) as f64 * 0.6 - 2.4));

        let config = BimodalityConfig {
            max_components: 3,
            n_init: 5,
            ..BimodalityConfig::default()
        };
        let report = ModalityReport::from_values("BDP=2000", &values, &config).unwrap();

        assert_eq!(report.n_seeds, 80);
        assert_eq!(report.split.high.count, 40);
        assert_eq!(report.selection.bics.len(), 3);

        let text = report.to_string();
        assert!(text.contains("BIMODALITY ANALYSIS: BDP=2000 (N=80)"));
        assert!(text.contains("K=1: BIC="));
        assert!(text.contains("Component 1: mu="));
        assert_eq!(report.values.len(), 80);
        assert!(report.best_bic() <= report.unimodal_bic().unwrap());
    }

    #[test]
    fn test_contrast_flags_multimodal_scenarios() {
        let config = BimodalityConfig {
            max_components: 3,
            n_init: 5,
            ..BimodalityConfig::default()
        };

        let single: Vec<f64> = (0..60).map(|i| 35.0 + (i % 10) as f64 * 0.8).collect();
        let mut split: Vec<f64> = (0..40).map(|i| 30.0 + (i % 8) as f64 * 0.7).collect();
        split.extend((0..40).map(|i| 72.0 + (i % 9) as f64 * 0.6));

        let reports = vec![
            ModalityReport::from_values("BDP=0", &single, &config).unwrap(),
            ModalityReport::from_values("BDP=2000", &split, &config).unwrap(),
        ];
        let contrast = ModalityContrast::from_reports(config.threshold, &reports);

        assert_eq!(contrast.rows.len(), 2);
        assert_eq!(contrast.rows[0].high_share_pct, 0.0);
        assert_eq!(contrast.rows[1].high_share_pct, 50.0);
        assert!(contrast.rows[1].bic_gain() > 0.0);
        assert!(contrast.multimodal().contains(&"BDP=2000"));

        let text = contrast.to_string();
        assert!(text.contains("CROSS-SCENARIO CONTRAST"));
        assert!(text.contains("BDP=2000"));
    }
}
