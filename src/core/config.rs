//! Analysis configuration with documented constants
//!
//! The welfare constants (population, propensity to consume) and the
//! scenario list are injected into every computation from here. Nothing
//! reads process-wide state; a config is built once in `main` and passed
//! down by reference.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{AnalysisError, Result};

/// Constants of the two-class welfare model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelfareConfig {
    /// Number of households in the simulated economy
    ///
    /// Head counts are derived from the unemployment rate by truncation,
    /// so this also fixes the granularity of the two income classes.
    pub population: u64,

    /// Marginal propensity to consume
    ///
    /// Fraction of income turned into consumption spending. Uniform across
    /// both income classes.
    pub mpc: f64,

    /// Minimum batch size before records are evaluated in parallel
    ///
    /// Records are independent, so the threshold only affects speed.
    pub parallel_threshold: usize,
}

impl Default for WelfareConfig {
    fn default() -> Self {
        Self {
            population: 100_000,
            mpc: 0.82,
            parallel_threshold: 1000,
        }
    }
}

impl WelfareConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(AnalysisError::InvalidConfig(
                "population must be positive".into(),
            ));
        }

        if !(self.mpc > 0.0 && self.mpc <= 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "mpc ({}) must lie in (0, 1]",
                self.mpc
            )));
        }

        Ok(())
    }
}

/// One policy scenario: a terminal CSV and the transfer it was run with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display label, e.g. "BDP=2000"
    pub label: String,
    /// Terminal CSV file name, relative to `results_dir`
    pub file: PathBuf,
    /// Basic income transfer (PLN/month)
    pub bdp_amount: f64,
    /// Per-month aggregate CSV; derived from `file` when omitted
    #[serde(default)]
    pub timeseries: Option<PathBuf>,
}

impl Scenario {
    pub fn new(label: impl Into<String>, file: impl Into<PathBuf>, bdp_amount: f64) -> Self {
        Self {
            label: label.into(),
            file: file.into(),
            bdp_amount,
            timeseries: None,
        }
    }

    /// `baseline_terminal.csv` pairs with `baseline_timeseries.csv`
    pub fn timeseries_file(&self) -> PathBuf {
        if let Some(file) = &self.timeseries {
            return file.clone();
        }
        let name = self.file.to_string_lossy();
        let prefix = name
            .strip_suffix("_terminal.csv")
            .or_else(|| name.strip_suffix(".csv"))
            .unwrap_or(&*name);
        PathBuf::from(format!("{}_timeseries.csv", prefix))
    }
}

/// Grid of transfer levels covered by a sweep run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Directory holding `sweep_{bdp}_terminal.csv` files
    pub dir: PathBuf,
    pub start: u32,
    pub stop: u32,
    pub step: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results/sweep"),
            start: 0,
            stop: 5000,
            step: 250,
        }
    }
}

impl SweepConfig {
    /// Transfer levels from `start` to `stop` inclusive
    pub fn levels(&self) -> Vec<u32> {
        (self.start..=self.stop).step_by(self.step.max(1) as usize).collect()
    }
}

/// Options for the bimodality diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BimodalityConfig {
    /// Label of the scenario examined in detail
    pub scenario: String,

    /// Adoption level (%) separating the low and high attractors
    ///
    /// 55% sits between the two clusters observed at BDP=2000.
    pub threshold: f64,

    /// Largest mixture size tried during BIC selection
    pub max_components: usize,

    /// EM restarts per mixture size; the best log-likelihood wins
    pub n_init: usize,

    /// Seed for the restart initialisation
    pub seed: u64,
}

impl Default for BimodalityConfig {
    fn default() -> Self {
        Self {
            scenario: "BDP=2000".to_string(),
            threshold: 55.0,
            max_components: 5,
            n_init: 10,
            seed: 42,
        }
    }
}

/// Figure settings shared by every chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Month the transfer is switched on; marked on time-series panels
    pub shock_month: f64,

    /// Bins per histogram
    pub histogram_bins: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            shock_month: 30.0,
            histogram_bins: 20,
        }
    }
}

/// Top-level configuration, usually read from `analysis.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub results_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub welfare: WelfareConfig,
    pub scenarios: Vec<Scenario>,
    pub sweep: SweepConfig,
    pub bimodality: BimodalityConfig,
    pub charts: ChartConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            figures_dir: PathBuf::from("figures"),
            welfare: WelfareConfig::default(),
            scenarios: vec![
                Scenario::new("BDP=0", "nobdp_terminal.csv", 0.0),
                Scenario::new("BDP=2000", "baseline_terminal.csv", 2000.0),
                Scenario::new("BDP=3000", "bdp3000_terminal.csv", 3000.0),
            ],
            sweep: SweepConfig::default(),
            bimodality: BimodalityConfig::default(),
            charts: ChartConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a config from TOML text; omitted sections keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        self.welfare.validate()?;

        if self.scenarios.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "at least one scenario is required".into(),
            ));
        }

        for scenario in &self.scenarios {
            if !scenario.bdp_amount.is_finite() || scenario.bdp_amount < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "scenario '{}' has invalid bdp_amount {}",
                    scenario.label, scenario.bdp_amount
                )));
            }
        }

        if self.sweep.step == 0 || self.sweep.start > self.sweep.stop {
            return Err(AnalysisError::InvalidConfig(format!(
                "sweep range {}..={} step {} is empty",
                self.sweep.start, self.sweep.stop, self.sweep.step
            )));
        }

        if self.bimodality.max_components == 0 || self.bimodality.n_init == 0 {
            return Err(AnalysisError::InvalidConfig(
                "bimodality.max_components and bimodality.n_init must be positive".into(),
            ));
        }

        if self.charts.histogram_bins == 0 {
            return Err(AnalysisError::InvalidConfig(
                "charts.histogram_bins must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Path of a scenario's terminal CSV
    pub fn scenario_path(&self, scenario: &Scenario) -> PathBuf {
        self.results_dir.join(&scenario.file)
    }

    pub fn timeseries_path(&self, scenario: &Scenario) -> PathBuf {
        self.results_dir.join(scenario.timeseries_file())
    }

    pub fn find_scenario(&self, label: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.label == label)
    }
}
