//! Welfare and inequality metrics of policy scenarios

pub mod calculator;
pub mod report;

pub use calculator::{ClassSizes, WelfareCalculator};
pub use report::{ScenarioWelfare, WelfareReport};
