//! CLI error types.

use thiserror::Error;

/// CLI result type.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by `forecast` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration value could not be parsed.
    #[error("Invalid setting {key}={value}: {reason}")]
    InvalidSetting {
        /// Setting name (file key or environment variable).
        key: String,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: String,
    },

    /// A CSV cell is not a number.
    #[error("Invalid number '{value}' at line {line}, column {column}")]
    InvalidNumber {
        /// One-based line number in the input file.
        line: u64,
        /// Column header.
        column: String,
        /// Cell content.
        value: String,
    },

    /// The simulation was cancelled before completing.
    #[error("Simulation cancelled after {completed} of {requested} scenarios")]
    Cancelled {
        /// Scenarios that had finished.
        completed: usize,
        /// Scenarios requested.
        requested: usize,
    },

    /// Historical data or weights rejected.
    #[error(transparent)]
    Data(#[from] forecast_core::DataError),

    /// Simulation configuration rejected.
    #[error(transparent)]
    Config(#[from] forecast_engine::ConfigError),

    /// Simulation could not start.
    #[error(transparent)]
    Simulation(#[from] forecast_engine::SimulationError),

    /// Summary could not be produced.
    #[error(transparent)]
    Summary(#[from] forecast_risk::SummaryError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("Configuration file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid setting error
    pub fn invalid_setting(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
