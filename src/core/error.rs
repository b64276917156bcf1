use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid price level {value} at row {row}: must be positive")]
    InvalidPriceLevel { row: usize, value: f64 },

    #[error("Invalid unemployment rate {value} at row {row}: must lie in [0, 1]")]
    InvalidUnemploymentRate { row: usize, value: f64 },

    #[error("Invalid market wage {value} at row {row}: must be finite and non-negative")]
    InvalidMarketWage { row: usize, value: f64 },

    #[error("Missing column '{column}'{}", .row.map(|r| format!(" at row {}", r)).unwrap_or_default())]
    MissingColumn { column: String, row: Option<usize> },

    #[error("Invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Empty sample: {0}")]
    EmptySample(String),

    #[error("Degenerate sample: {0}")]
    DegenerateSample(String),

    #[error("Insufficient data: need at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
