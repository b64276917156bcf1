//! Per-month aggregates across seeds
//!
//! Every metric `X` is stored as three columns, `X_mean`, `X_p05` and
//! `X_p95`, next to a `Month` column. The text format is the one used for
//! terminal files.

use std::path::Path;

use serde::Serialize;

use crate::core::error::{AnalysisError, Result};
use crate::data::terminal::TerminalTable;

pub const COL_MONTH: &str = "Month";

/// Mean and 90% interval of one metric over time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub mean: Vec<f64>,
    pub p05: Vec<f64>,
    pub p95: Vec<f64>,
}

impl Band {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Lowest p05 and highest p95
    pub fn extent(&self) -> Option<(f64, f64)> {
        let lo = self.p05.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.p95.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lo <= hi).then_some((lo, hi))
    }
}

#[derive(Debug, Clone)]
pub struct TimeseriesTable {
    table: TerminalTable,
}

impl TimeseriesTable {
    pub fn parse(contents: &str) -> Result<Self> {
        Self::from_table(TerminalTable::parse(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_table(TerminalTable::load(path)?)
    }

    fn from_table(table: TerminalTable) -> Result<Self> {
        if !table.has_column(COL_MONTH) {
            return Err(AnalysisError::MissingColumn {
                column: COL_MONTH.to_string(),
                row: None,
            });
        }
        Ok(Self { table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn months(&self) -> Result<Vec<f64>> {
        self.table.column(COL_MONTH)
    }

    /// True when all three columns of `metric` are present
    pub fn has_metric(&self, metric: &str) -> bool {
        ["mean", "p05", "p95"]
            .iter()
            .all(|suffix| self.table.has_column(&format!("{}_{}", metric, suffix)))
    }

    /// Band of `metric`, every value multiplied by `factor`
    pub fn band(&self, metric: &str, factor: f64) -> Result<Band> {
        let column = |suffix: &str| {
            self.table
                .scaled_column(&format!("{}_{}", metric, suffix), factor)
        };
        Ok(Band {
            mean: column("mean")?,
            p05: column("p05")?,
            p95: column("p95")?,
        })
    }
}
