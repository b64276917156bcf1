//! Two-class welfare model
//!
//! The population is split into employed households (wage plus transfer)
//! and unemployed households (transfer only). Consumption is a fixed
//! share of income, and the Gini coefficient has a closed form for two
//! point masses.

use rayon::prelude::*;

use crate::core::config::WelfareConfig;
use crate::core::error::{AnalysisError, Result};
use crate::core::types::{SeedRecord, WelfareRecord};

/// Head counts of the two income classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSizes {
    pub employed: u64,
    pub unemployed: u64,
}

/// Computes [`WelfareRecord`]s under a fixed [`WelfareConfig`]
#[derive(Debug, Clone)]
pub struct WelfareCalculator {
    config: WelfareConfig,
}

impl WelfareCalculator {
    pub fn new(config: WelfareConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WelfareConfig {
        &self.config
    }

    /// Split the population; the employed count is truncated, not rounded
    pub fn class_sizes(&self, unemployment_rate: f64) -> ClassSizes {
        let pop = self.config.population;
        let employed = (((1.0 - unemployment_rate) * pop as f64).trunc() as u64).min(pop);
        ClassSizes {
            employed,
            unemployed: pop - employed,
        }
    }

    /// Welfare metrics of one seed; `row` only labels errors
    pub fn compute(
        &self,
        row: usize,
        record: &SeedRecord,
        bdp_amount: f64,
    ) -> Result<WelfareRecord> {
        let u = record.unemployment_rate;
        if !(0.0..=1.0).contains(&u) {
            return Err(AnalysisError::InvalidUnemploymentRate { row, value: u });
        }
        if !(record.price_level.is_finite() && record.price_level > 0.0) {
            return Err(AnalysisError::InvalidPriceLevel {
                row,
                value: record.price_level,
            });
        }
        if !(record.market_wage.is_finite() && record.market_wage >= 0.0) {
            return Err(AnalysisError::InvalidMarketWage {
                row,
                value: record.market_wage,
            });
        }

        let pop = self.config.population as f64;
        let ClassSizes {
            employed,
            unemployed,
        } = self.class_sizes(u);

        let y_employed = record.market_wage + bdp_amount;
        let y_unemployed = bdp_amount;

        let total_income = employed as f64 * y_employed + unemployed as f64 * y_unemployed;
        let nominal_consumption = total_income * self.config.mpc / pop;
        let real_consumption = nominal_consumption / record.price_level;

        let gini = if total_income > 0.0 && y_employed != y_unemployed {
            employed as f64 * unemployed as f64 * (y_employed - y_unemployed).abs()
                / (pop * total_income)
        } else {
            0.0
        };

        Ok(WelfareRecord {
            real_consumption,
            gini,
            income_floor: bdp_amount,
            nominal_consumption,
        })
    }

    /// One record per input, in input order; any invalid row fails the batch
    pub fn compute_batch(
        &self,
        records: &[SeedRecord],
        bdp_amount: f64,
    ) -> Result<Vec<WelfareRecord>> {
        if records.len() >= self.config.parallel_threshold {
            records
                .par_iter()
                .enumerate()
                .map(|(row, record)| self.compute(row, record, bdp_amount))
                .collect()
        } else {
            records
                .iter()
                .enumerate()
                .map(|(row, record)| self.compute(row, record, bdp_amount))
                .collect()
        }
    }
}
