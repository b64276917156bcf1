//! Core record types shared by the loaders and the calculators

use serde::{Deserialize, Serialize};

/// Terminal state of one Monte Carlo trial (one random seed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    /// Fraction of the labour force without work
    pub unemployment_rate: f64,
    /// Market wage at the final month (PLN/month)
    pub market_wage: f64,
    /// Price index, 1.0 = base period
    pub price_level: f64,
    /// Economy-wide technology adoption share; carried for reporting only
    pub total_adoption: f64,
}

impl SeedRecord {
    pub fn new(unemployment_rate: f64, market_wage: f64, price_level: f64) -> Self {
        Self {
            unemployment_rate,
            market_wage,
            price_level,
            total_adoption: 0.0,
        }
    }

    pub fn with_adoption(mut self, total_adoption: f64) -> Self {
        self.total_adoption = total_adoption;
        self
    }
}

/// Welfare metrics derived from one [`SeedRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelfareRecord {
    /// Per-capita consumption deflated by the price level
    pub real_consumption: f64,
    /// Two-class Gini coefficient
    pub gini: f64,
    /// Unconditional transfer received by everyone
    pub income_floor: f64,
    /// Per-capita consumption in current prices
    pub nominal_consumption: f64,
}
