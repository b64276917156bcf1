//! Per-scenario welfare summaries and their console rendering

use std::fmt;

use serde::Serialize;

use crate::core::config::{AnalysisConfig, Scenario};
use crate::core::error::Result;
use crate::core::types::{SeedRecord, WelfareRecord};
use crate::data::terminal::TerminalTable;
use crate::stats::summary::{mean, sample_std, Summary};
use crate::welfare::calculator::WelfareCalculator;

const NAME_WIDTH: usize = 25;

/// Welfare outcome of one scenario across all seeds
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioWelfare {
    pub label: String,
    pub bdp_amount: f64,
    pub records: Vec<WelfareRecord>,
    pub real_consumption: Summary,
    pub gini: Summary,
    pub nominal_consumption: Summary,
    pub income_floor: Summary,
    /// Mean adoption in percent
    pub adoption_mean_pct: f64,
    /// Sample standard deviation of adoption in percent
    pub adoption_std_pct: f64,
    /// Mean unemployment in percent
    pub unemployment_mean_pct: f64,
}

impl ScenarioWelfare {
    pub fn compute(
        calculator: &WelfareCalculator,
        scenario: &Scenario,
        seeds: &[SeedRecord],
    ) -> Result<Self> {
        let records = calculator.compute_batch(seeds, scenario.bdp_amount)?;

        let column = |f: fn(&WelfareRecord) -> f64| -> Vec<f64> { records.iter().map(f).collect() };
        let real_consumption = Summary::from_values(&column(|w| w.real_consumption))?;
        let gini = Summary::from_values(&column(|w| w.gini))?;
        let nominal_consumption = Summary::from_values(&column(|w| w.nominal_consumption))?;
        let income_floor = Summary::from_values(&column(|w| w.income_floor))?;

        let adoption: Vec<f64> = seeds.iter().map(|s| s.total_adoption).collect();
        let unemployment: Vec<f64> = seeds.iter().map(|s| s.unemployment_rate).collect();

        tracing::info!(
            "{}: {} seeds, real consumption {:.1}, gini {:.4}",
            scenario.label,
            records.len(),
            real_consumption.mean,
            gini.mean
        );

        Ok(Self {
            label: scenario.label.clone(),
            bdp_amount: scenario.bdp_amount,
            records,
            real_consumption,
            gini,
            nominal_consumption,
            income_floor,
            adoption_mean_pct: mean(&adoption) * 100.0,
            adoption_std_pct: sample_std(&adoption) * 100.0,
            unemployment_mean_pct: mean(&unemployment) * 100.0,
        })
    }

    pub fn n_seeds(&self) -> usize {
        self.records.len()
    }

    pub fn real_consumption_values(&self) -> Vec<f64> {
        self.records.iter().map(|w| w.real_consumption).collect()
    }

    pub fn gini_values(&self) -> Vec<f64> {
        self.records.iter().map(|w| w.gini).collect()
    }
}

impl fmt::Display for ScenarioWelfare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for (summary, name) in [
            (&self.real_consumption, "Real Consumption/cap"),
            (&self.gini, "Gini Coefficient"),
            (&self.nominal_consumption, "Nominal Consumption/cap"),
            (&self.income_floor, "Income Floor"),
        ] {
            writeln!(f, "  {}", summary.format_line(name, NAME_WIDTH, 1))?;
        }
        writeln!(
            f,
            "  {:<w$}: {:>8.1} ± {:>6.1}",
            "Adoption (%)",
            self.adoption_mean_pct,
            self.adoption_std_pct,
            w = NAME_WIDTH
        )
    }
}

/// Welfare summaries for every configured scenario
#[derive(Debug, Clone, Serialize)]
pub struct WelfareReport {
    pub scenarios: Vec<ScenarioWelfare>,
}

impl WelfareReport {
    /// Load every scenario's terminal file and compute its welfare summary
    pub fn analyze(config: &AnalysisConfig) -> Result<Self> {
        let calculator = WelfareCalculator::new(config.welfare.clone())?;
        let scenarios = config
            .scenarios
            .iter()
            .map(|scenario| {
                let table = TerminalTable::load(&config.scenario_path(scenario))?;
                let seeds = table.seed_records()?;
                ScenarioWelfare::compute(&calculator, scenario, &seeds)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { scenarios })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for WelfareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seeds = self.scenarios.first().map_or(0, |s| s.n_seeds());
        writeln!(f, "{}", "=".repeat(70))?;
        writeln!(f, "WELFARE ANALYSIS (Monte Carlo, N={})", seeds)?;
        writeln!(f, "{}", "=".repeat(70))?;
        for scenario in &self.scenarios {
            writeln!(f)?;
            write!(f, "{}", scenario)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WelfareConfig;

    fn seeds() -> Vec<SeedRecord> {
        vec![
            SeedRecord::new(0.05, 4000.0, 1.10).with_adoption(0.60),
            SeedRecord::new(0.05, 4000.0, 1.10).with_adoption(0.40),
        ]
    }

    #[test]
    fn test_scenario_summary() {
        let calc = WelfareCalculator::new(WelfareConfig::default()).unwrap();
        let scenario = Scenario::new("BDP=2000", "baseline_terminal.csv", 2000.0);
        let welfare = ScenarioWelfare::compute(&calc, &scenario, &seeds()).unwrap();

        assert_eq!(welfare.n_seeds(), 2);
        assert!((welfare.nominal_consumption.mean - 4756.0).abs() < 1e-9);
        assert_eq!(welfare.gini.std, 0.0);
        assert_eq!(welfare.income_floor.mean, 2000.0);
        assert!((welfare.adoption_mean_pct - 50.0).abs() < 1e-9);
        // sample std of [0.6, 0.4] is sqrt(0.02)
        assert!((welfare.adoption_std_pct - 0.02f64.sqrt() * 100.0).abs() < 1e-9);
        assert!((welfare.unemployment_mean_pct - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_rendering() {
        let calc = WelfareCalculator::new(WelfareConfig::default()).unwrap();
        let scenario = Scenario::new("BDP=2000", "baseline_terminal.csv", 2000.0);
        let report = WelfareReport {
            scenarios: vec![ScenarioWelfare::compute(&calc, &scenario, &seeds()).unwrap()],
        };

        let text = report.to_string();
        assert!(text.contains("WELFARE ANALYSIS (Monte Carlo, N=2)"));
        assert!(text.contains("BDP=2000:"));
        assert!(text.contains("  Nominal Consumption/cap  :   4756.0 ±    0.0  [  4756.0,   4756.0]"));
        assert!(text.contains("  Income Floor             :   2000.0"));
        assert!(text.contains("Adoption (%)"));
    }

    #[test]
    fn test_report_json() {
        let calc = WelfareCalculator::new(WelfareConfig::default()).unwrap();
        let scenario = Scenario::new("BDP=0", "nobdp_terminal.csv", 0.0);
        let report = WelfareReport {
            scenarios: vec![ScenarioWelfare::compute(&calc, &scenario, &seeds()).unwrap()],
        };
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["scenarios"][0]["label"], "BDP=0");
        assert_eq!(json["scenarios"][0]["records"].as_array().unwrap().len(), 2);
    }
}
