//! MC Welfare - Monte Carlo welfare analysis of basic-income scenarios
//!
//! Reads the terminal state of agent-based simulation runs (one row per
//! random seed) and derives per-seed welfare metrics, essay summary tables,
//! adoption bimodality diagnostics and BDP sweep statistics.

pub mod chart;
pub mod core;
pub mod data;
pub mod overview;
pub mod stats;
pub mod sweep;
pub mod welfare;
