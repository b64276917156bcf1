//! Loading Monte Carlo output files

pub mod decimal;
pub mod terminal;
pub mod timeseries;

pub use decimal::parse_decimal;
pub use terminal::TerminalTable;
pub use timeseries::{Band, TimeseriesTable};
