//! Per-seed terminal tables
//!
//! One file per scenario, one row per random seed, `;` between fields.
//! Columns are kept as raw text and parsed only when asked for, so
//! unrelated columns with odd content never block an analysis.

use std::fs;
use std::path::Path;

use ahash::AHashMap;

use crate::core::error::{AnalysisError, Result};
use crate::core::types::SeedRecord;
use crate::data::decimal::parse_decimal;

pub const FIELD_SEPARATOR: char = ';';

pub const COL_UNEMPLOYMENT: &str = "Unemployment";
pub const COL_MARKET_WAGE: &str = "MarketWage";
pub const COL_PRICE_LEVEL: &str = "PriceLevel";
pub const COL_TOTAL_ADOPTION: &str = "TotalAdoption";
pub const COL_INFLATION: &str = "Inflation";

/// A loaded terminal CSV
#[derive(Debug, Clone)]
pub struct TerminalTable {
    headers: Vec<String>,
    index: AHashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl TerminalTable {
    /// Parse table text; the first non-blank line is the header
    pub fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty());

        let header_line = lines
            .next()
            .ok_or_else(|| AnalysisError::EmptySample("terminal file has no header".into()))?;

        let headers: Vec<String> = header_line
            .trim_start_matches('\u{feff}')
            .split(FIELD_SEPARATOR)
            .map(|name| name.trim().trim_matches('"').to_string())
            .collect();

        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let rows = lines
            .map(|line| {
                line.split(FIELD_SEPARATOR)
                    .map(|field| field.trim().trim_matches('"').to_string())
                    .collect()
            })
            .collect();

        Ok(Self {
            headers,
            index,
            rows,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let table = Self::parse(&contents)?;
        tracing::debug!(
            "Loaded {} seeds x {} columns from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Number of seed rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Parse every value of a column; fails fast on the first bad row
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = *self.index.get(name).ok_or_else(|| AnalysisError::MissingColumn {
            column: name.to_string(),
            row: None,
        })?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row, fields)| {
                let raw = fields.get(idx).ok_or_else(|| AnalysisError::MissingColumn {
                    column: name.to_string(),
                    row: Some(row),
                })?;
                parse_decimal(raw).ok_or_else(|| AnalysisError::InvalidNumber {
                    column: name.to_string(),
                    row,
                    value: raw.clone(),
                })
            })
            .collect()
    }

    /// Column scaled by a constant (e.g. shares to percent)
    pub fn scaled_column(&self, name: &str, factor: f64) -> Result<Vec<f64>> {
        Ok(self.column(name)?.into_iter().map(|v| v * factor).collect())
    }

    /// Like [`column`](Self::column), but an absent column yields `None`
    pub fn optional_column(&self, name: &str) -> Result<Option<Vec<f64>>> {
        if self.has_column(name) {
            self.column(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Rows as welfare inputs, in file order
    pub fn seed_records(&self) -> Result<Vec<SeedRecord>> {
        let unemployment = self.column(COL_UNEMPLOYMENT)?;
        let wage = self.column(COL_MARKET_WAGE)?;
        let price = self.column(COL_PRICE_LEVEL)?;
        let adoption = self.column(COL_TOTAL_ADOPTION)?;

        Ok(unemployment
            .into_iter()
            .zip(wage)
            .zip(price)
            .zip(adoption)
            .map(|(((u, w), p), a)| SeedRecord::new(u, w, p).with_adoption(a))
            .collect())
    }
}
