//! Simulation configuration.
//!
//! This module provides [`SimulationConfig`] and its builder. Configurations
//! are validated once at build time and are immutable afterwards.

use forecast_core::CovarianceDenominator;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Maximum number of scenarios allowed.
pub const MAX_SCENARIOS: usize = 10_000_000;

/// Maximum number of simulated days allowed per scenario.
pub const MAX_DAYS: usize = 10_000;

/// Scenario count from which scenarios are simulated on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Which full value paths a run keeps.
///
/// Ending values are always kept for every scenario. Full paths cost
/// `8 × (days + 1)` bytes each.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRetention {
    /// Keep the path of every scenario.
    #[default]
    All,
    /// Keep ending values only.
    EndingOnly,
    /// Keep full paths for the first `n` scenarios (e.g. for plotting).
    Sample(usize),
}

impl PathRetention {
    /// Number of paths retained out of `n_scenarios`.
    #[inline]
    pub fn retained(self, n_scenarios: usize) -> usize {
        match self {
            Self::All => n_scenarios,
            Self::EndingOnly => 0,
            Self::Sample(n) => n.min(n_scenarios),
        }
    }
}

/// Path simulation configuration.
///
/// Use [`SimulationConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::config::{PathRetention, SimulationConfig};
///
/// let config = SimulationConfig::builder()
///     .n_scenarios(1_000)
///     .n_days(252)
///     .starting_capital(100_000.0)
///     .seed(42)
///     .path_retention(PathRetention::Sample(50))
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_scenarios(), 1_000);
/// assert_eq!(config.seed(), Some(42));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationConfig {
    n_scenarios: usize,
    n_days: usize,
    starting_capital: f64,
    seed: Option<u64>,
    denominator: CovarianceDenominator,
    path_retention: PathRetention,
    parallel_threshold: usize,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Number of independent scenarios (S).
    #[inline]
    pub fn n_scenarios(&self) -> usize {
        self.n_scenarios
    }

    /// Number of simulated days per scenario (D).
    #[inline]
    pub fn n_days(&self) -> usize {
        self.n_days
    }

    /// Portfolio value on day 0.
    #[inline]
    pub fn starting_capital(&self) -> f64 {
        self.starting_capital
    }

    /// Optional base seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Covariance denominator used when estimating from raw returns.
    #[inline]
    pub fn denominator(&self) -> CovarianceDenominator {
        self.denominator
    }

    /// Path retention policy.
    #[inline]
    pub fn path_retention(&self) -> PathRetention {
        self.path_retention
    }

    /// Minimum scenario count for parallel execution.
    #[inline]
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - `EmptySimulation` if scenarios or days is zero
    /// - `TooManyScenarios` / `TooManyDays` above the hard limits
    /// - `InvalidStartingCapital` unless capital is positive and finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_scenarios == 0 || self.n_days == 0 {
            return Err(ConfigError::EmptySimulation {
                scenarios: self.n_scenarios,
                days: self.n_days,
            });
        }
        if self.n_scenarios > MAX_SCENARIOS {
            return Err(ConfigError::TooManyScenarios(self.n_scenarios));
        }
        if self.n_days > MAX_DAYS {
            return Err(ConfigError::TooManyDays(self.n_days));
        }
        if !(self.starting_capital.is_finite() && self.starting_capital > 0.0) {
            return Err(ConfigError::InvalidStartingCapital(self.starting_capital));
        }
        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    n_scenarios: Option<usize>,
    n_days: Option<usize>,
    starting_capital: Option<f64>,
    seed: Option<u64>,
    denominator: CovarianceDenominator,
    path_retention: PathRetention,
    parallel_threshold: Option<usize>,
}

impl SimulationConfigBuilder {
    /// Sets the number of scenarios, in [1, 10_000_000].
    #[inline]
    pub fn n_scenarios(mut self, n_scenarios: usize) -> Self {
        self.n_scenarios = Some(n_scenarios);
        self
    }

    /// Sets the number of simulated days, in [1, 10_000].
    #[inline]
    pub fn n_days(mut self, n_days: usize) -> Self {
        self.n_days = Some(n_days);
        self
    }

    /// Sets the starting capital.
    #[inline]
    pub fn starting_capital(mut self, capital: f64) -> Self {
        self.starting_capital = Some(capital);
        self
    }

    /// Sets the base seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets or clears the base seed.
    #[inline]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the covariance denominator.
    #[inline]
    pub fn denominator(mut self, denominator: CovarianceDenominator) -> Self {
        self.denominator = denominator;
        self
    }

    /// Sets the path retention policy.
    #[inline]
    pub fn path_retention(mut self, retention: PathRetention) -> Self {
        self.path_retention = retention;
        self
    }

    /// Sets the scenario count from which the rayon pool is used.
    /// `usize::MAX` forces sequential execution.
    #[inline]
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// `MissingParameter` for unset required fields, otherwise any error
    /// from [`SimulationConfig::validate`].
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let config = SimulationConfig {
            n_scenarios: self
                .n_scenarios
                .ok_or(ConfigError::MissingParameter("n_scenarios"))?,
            n_days: self.n_days.ok_or(ConfigError::MissingParameter("n_days"))?,
            starting_capital: self
                .starting_capital
                .ok_or(ConfigError::MissingParameter("starting_capital"))?,
            seed: self.seed,
            denominator: self.denominator,
            path_retention: self.path_retention,
            parallel_threshold: self.parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD),
        };

        config.validate()?;
        Ok(config)
    }
}
