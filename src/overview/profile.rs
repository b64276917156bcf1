//! Per-seed adoption profile of one scenario
//!
//! Feeds the adoption histogram, the sector bars and the adoption by
//! inflation phase plot. Spreads are sample standard deviations.

use serde::Serialize;

use crate::core::config::Scenario;
use crate::core::error::Result;
use crate::data::terminal::{TerminalTable, COL_INFLATION, COL_TOTAL_ADOPTION};
use crate::overview::scenario::SECTOR_METRICS;
use crate::stats::summary::{mean, sample_std};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorShare {
    pub name: String,
    /// Mean adoption in percent
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioProfile {
    pub label: String,
    pub bdp_amount: f64,
    /// Per-seed total adoption (%)
    pub adoption_pct: Vec<f64>,
    /// Per-seed inflation (%)
    pub inflation_pct: Vec<f64>,
    /// Sectors present in the file, in display order
    pub sectors: Vec<SectorShare>,
}

impl ScenarioProfile {
    pub fn from_table(scenario: &Scenario, table: &TerminalTable) -> Result<Self> {
        let mut sectors = Vec::new();
        for (column, name) in SECTOR_METRICS {
            if let Some(values) = table.optional_column(column)? {
                let pct: Vec<f64> = values.iter().map(|v| v * 100.0).collect();
                sectors.push(SectorShare {
                    name: name.to_string(),
                    mean: mean(&pct),
                    std: sample_std(&pct),
                });
            }
        }

        Ok(Self {
            label: scenario.label.clone(),
            bdp_amount: scenario.bdp_amount,
            adoption_pct: table.scaled_column(COL_TOTAL_ADOPTION, 100.0)?,
            inflation_pct: table.scaled_column(COL_INFLATION, 100.0)?,
            sectors,
        })
    }

    pub fn n_seeds(&self) -> usize {
        self.adoption_pct.len()
    }

    pub fn adoption_mean(&self) -> f64 {
        mean(&self.adoption_pct)
    }

    pub fn sector(&self, name: &str) -> Option<&SectorShare> {
        self.sectors.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "TotalAdoption;Inflation;BPO_Auto;Manuf_Auto\n\
                         0,4;0,02;0,8;0,3\n\
                         0,6;-0,01;0,9;0,5\n";

    #[test]
    fn test_profile_in_percent() {
        let table = TerminalTable::parse(TABLE).unwrap();
        let scenario = Scenario::new("BDP=2000", "baseline_terminal.csv", 2000.0);
        let profile = ScenarioProfile::from_table(&scenario, &table).unwrap();

        assert_eq!(profile.n_seeds(), 2);
        assert_eq!(profile.bdp_amount, 2000.0);
        assert!((profile.adoption_mean() - 50.0).abs() < 1e-9);
        assert!((profile.inflation_pct[1] + 1.0).abs() < 1e-9);

        assert_eq!(profile.sectors.len(), 2);
        let manuf = profile.sector("Manufacturing").unwrap();
        assert!((manuf.mean - 40.0).abs() < 1e-9);
        // ddof 1: two values 30 and 50
        assert!((manuf.std - 200f64.sqrt()).abs() < 1e-9);
        assert!(profile.sector("Healthcare").is_none());
    }
}
