//! Error types for the simulation engine.
//!
//! This module defines structured error types for configuration validation
//! and for the eager checks performed before any scenario is simulated.

use forecast_core::{DataError, DecompositionError};
use thiserror::Error;

/// Configuration error for the path simulator.
///
/// These errors occur at build time when invalid parameters are provided.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Zero scenarios or zero days requested.
    #[error("Empty simulation: {scenarios} scenario(s) over {days} day(s), both must be positive")]
    EmptySimulation {
        /// Requested scenario count.
        scenarios: usize,
        /// Requested day count.
        days: usize,
    },

    /// Scenario count above [`MAX_SCENARIOS`](crate::config::MAX_SCENARIOS).
    #[error("Invalid scenario count {0}: must be at most 10_000_000")]
    TooManyScenarios(usize),

    /// Day count above [`MAX_DAYS`](crate::config::MAX_DAYS).
    #[error("Invalid day count {0}: must be at most 10_000")]
    TooManyDays(usize),

    /// Starting capital is zero, negative or not finite.
    #[error("Invalid starting capital {0}: must be positive and finite")]
    InvalidStartingCapital(f64),

    /// A required parameter was not set on the builder.
    #[error("Missing parameter '{0}'")]
    MissingParameter(&'static str),
}

/// Error raised by [`PathSimulator`](crate::simulator::PathSimulator) before
/// simulation work begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Invalid simulation configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid historical data or weights.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Covariance matrix could not be decomposed.
    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
}
