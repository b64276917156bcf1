pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AnalysisConfig, BimodalityConfig, ChartConfig, Scenario, SweepConfig, WelfareConfig,
};
pub use error::{AnalysisError, Result};
pub use types::{SeedRecord, WelfareRecord};
