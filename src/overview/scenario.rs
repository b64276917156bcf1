//! Macro and sector statistics of one scenario's terminal state

use std::fmt;

use serde::Serialize;

use crate::core::error::Result;
use crate::data::terminal::TerminalTable;
use crate::stats::summary::Summary;

const NAME_WIDTH: usize = 20;

/// Terminal column, display name, display multiplier
pub const MACRO_METRICS: [(&str, &str, f64); 7] = [
    ("TotalAdoption", "Adoption", 100.0),
    ("Inflation", "Inflation", 100.0),
    ("Unemployment", "Unemployment", 100.0),
    ("ExRate", "Exchange Rate", 1.0),
    ("MarketWage", "Market Wage", 1.0),
    ("GovDebt", "Gov Debt (mld)", 1e-9),
    ("NPL", "NPL Ratio", 100.0),
];

/// Sector automation columns; the last two exist only in GUS-calibrated runs
pub const SECTOR_METRICS: [(&str, &str); 6] = [
    ("BPO_Auto", "BPO/SSC"),
    ("Manuf_Auto", "Manufacturing"),
    ("Retail_Auto", "Retail/Services"),
    ("Health_Auto", "Healthcare"),
    ("Public_Auto", "Public"),
    ("Agri_Auto", "Agriculture"),
];

#[derive(Debug, Clone, Serialize)]
pub struct NamedSummary {
    pub name: String,
    pub summary: Summary,
}

/// Summary statistics of one scenario, columns absent from the file skipped
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOverview {
    pub label: String,
    pub n_seeds: usize,
    pub metrics: Vec<NamedSummary>,
    /// Sector adoption in percent
    pub sectors: Vec<NamedSummary>,
}

fn summarise(
    table: &TerminalTable,
    label: &str,
    column: &str,
    name: &str,
    factor: f64,
) -> Result<Option<NamedSummary>> {
    if !table.has_column(column) {
        tracing::debug!("{}: column {} not present, skipped", label, column);
        return Ok(None);
    }
    let values = table.scaled_column(column, factor)?;
    Ok(Some(NamedSummary {
        name: name.to_string(),
        summary: Summary::from_values(&values)?,
    }))
}

impl ScenarioOverview {
    pub fn from_table(label: &str, table: &TerminalTable) -> Result<Self> {
        let mut metrics = Vec::new();
        for (column, name, factor) in MACRO_METRICS {
            if let Some(s) = summarise(table, label, column, name, factor)? {
                metrics.push(s);
            }
        }

        let mut sectors = Vec::new();
        for (column, name) in SECTOR_METRICS {
            if let Some(s) = summarise(table, label, column, name, 100.0)? {
                sectors.push(s);
            }
        }

        Ok(Self {
            label: label.to_string(),
            n_seeds: table.len(),
            metrics,
            sectors,
        })
    }

    pub fn metric(&self, name: &str) -> Option<&Summary> {
        self.metrics
            .iter()
            .chain(&self.sectors)
            .find(|m| m.name == name)
            .map(|m| &m.summary)
    }
}

impl fmt::Display for ScenarioOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (N={} seeds):", self.label, self.n_seeds)?;
        for m in &self.metrics {
            writeln!(f, "  {}", m.summary.format_line(&m.name, NAME_WIDTH, 2))?;
        }
        for s in &self.sectors {
            writeln!(f, "  {}", s.summary.format_short(&s.name, NAME_WIDTH, 2))?;
        }
        Ok(())
    }
}
