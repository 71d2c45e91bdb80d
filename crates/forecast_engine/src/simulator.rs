//! Path simulator.
//!
//! For every scenario `s` in `0..S`, starting from the configured capital:
//!
//! ```text
//! value(0) = capital
//! value(d) = value(d-1) × (1 + Σᵢ wᵢ · shockᵢ(s, d)),   d = 1..=D
//! ```
//!
//! where `shock(s, d)` comes from the [`CorrelationSampler`] driven by the
//! scenario's own [`ScenarioRng`] stream. No autocorrelation is modelled and
//! values are never floored: negative or non-finite values are kept as data.
//!
//! # Execution
//!
//! Everything that can fail (weights, decomposition) is checked before the
//! first scenario runs. Scenarios then run sequentially or on the rayon pool
//! depending on [`SimulationConfig::parallel_threshold`]; both produce the
//! same result because no random stream is shared.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use forecast_core::{estimate, HistoricalReturns, MarketStatistics, Weights};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::result::{PathMatrix, SimulationResult, SimulationRun};
use crate::rng::{random_base_seed, ScenarioRng};
use crate::sampler::CorrelationSampler;

/// Per-worker scratch space for one draw and one shock vector.
struct ScenarioBuffers {
    z: Vec<f64>,
    shock: Vec<f64>,
}

impl ScenarioBuffers {
    fn new(n_assets: usize) -> Self {
        Self {
            z: vec![0.0; n_assets],
            shock: vec![0.0; n_assets],
        }
    }
}

struct ScenarioOutcome {
    ending: f64,
    path: Option<Vec<f64>>,
}

/// Monte Carlo path simulator.
///
/// # Examples
///
/// ```rust
/// use forecast_core::{CovarianceMatrix, MarketStatistics, MeanVector, WeightPolicy, Weights};
/// use forecast_engine::config::SimulationConfig;
/// use forecast_engine::simulator::PathSimulator;
///
/// let stats = MarketStatistics::from_parts(
///     MeanVector::new(vec![0.0005, 0.0003]),
///     CovarianceMatrix::new(vec![0.0004, 0.0001, 0.0001, 0.0009], 2).unwrap(),
/// )
/// .unwrap();
/// let weights = Weights::new(vec![0.6, 0.4], WeightPolicy::FullyInvested).unwrap();
///
/// let config = SimulationConfig::builder()
///     .n_scenarios(100)
///     .n_days(252)
///     .starting_capital(10_000.0)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let result = PathSimulator::new(config)
///     .simulate(&stats, &weights)
///     .unwrap()
///     .into_result()
///     .unwrap();
///
/// assert_eq!(result.ending_values().len(), 100);
/// assert_eq!(result.paths().path(0).unwrap()[0], 10_000.0);
/// ```
#[derive(Clone, Debug)]
pub struct PathSimulator {
    config: SimulationConfig,
}

impl PathSimulator {
    /// Creates a simulator for a validated configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Estimates statistics from `returns` with the configured covariance
    /// denominator, then simulates.
    ///
    /// # Errors
    ///
    /// Any error of [`estimate`] or [`simulate`](Self::simulate).
    pub fn simulate_from_returns(
        &self,
        returns: &HistoricalReturns,
        weights: &Weights,
    ) -> Result<SimulationRun, SimulationError> {
        weights.ensure_len(returns.n_assets())?;
        let stats = estimate(returns, self.config.denominator())?;
        self.simulate(&stats, weights)
    }

    /// Simulates all scenarios to completion.
    ///
    /// # Errors
    ///
    /// - `Data(InvalidWeights)` if the weight count differs from the asset count
    /// - `Decomposition(NonPositiveSemidefinite)` if the covariance is degenerate
    pub fn simulate(
        &self,
        stats: &MarketStatistics,
        weights: &Weights,
    ) -> Result<SimulationRun, SimulationError> {
        self.simulate_with_cancellation(stats, weights, &CancellationToken::new())
    }

    /// Simulates all scenarios, stopping at the next scenario boundary once
    /// `token` is cancelled.
    ///
    /// A cancelled run returns [`SimulationRun::Cancelled`]; no partial
    /// result is produced.
    ///
    /// # Arguments
    ///
    /// * `stats` - Mean vector and covariance of daily asset returns
    /// * `weights` - Portfolio weights, one per asset
    /// * `token` - Checked before each scenario starts
    ///
    /// # Errors
    ///
    /// Same as [`simulate`](Self::simulate). Cancellation is not an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use forecast_core::{CovarianceMatrix, MarketStatistics, MeanVector, Weights};
    /// use forecast_engine::{CancellationToken, PathSimulator, SimulationConfig, SimulationRun};
    ///
    /// let stats = MarketStatistics::from_parts(
    ///     MeanVector::new(vec![0.0004]),
    ///     CovarianceMatrix::new(vec![0.0001], 1).unwrap(),
    /// )
    /// .unwrap();
    /// let weights = Weights::equal(1).unwrap();
    /// let config = SimulationConfig::builder()
    ///     .n_scenarios(1_000)
    ///     .n_days(21)
    ///     .starting_capital(1_000.0)
    ///     .build()
    ///     .unwrap();
    ///
    /// let token = CancellationToken::new();
    /// token.cancel();
    ///
    /// let run = PathSimulator::new(config)
    ///     .simulate_with_cancellation(&stats, &weights, &token)
    ///     .unwrap();
    /// assert_eq!(
    ///     run,
    ///     SimulationRun::Cancelled { completed: 0, requested: 1_000 }
    /// );
    /// ```
    pub fn simulate_with_cancellation(
        &self,
        stats: &MarketStatistics,
        weights: &Weights,
        token: &CancellationToken,
    ) -> Result<SimulationRun, SimulationError> {
        let n_scenarios = self.config.n_scenarios();
        let n_days = self.config.n_days();
        let capital = self.config.starting_capital();
        let n_assets = stats.n_assets();

        weights.ensure_len(n_assets)?;
        let sampler = CorrelationSampler::from_statistics(stats)?;

        let base_seed = self.config.seed().unwrap_or_else(random_base_seed);
        let n_retained = self.config.path_retention().retained(n_scenarios);
        let parallel = n_scenarios >= self.config.parallel_threshold();

        let _span =
            tracing::info_span!("simulate", scenarios = n_scenarios, days = n_days).entered();
        info!(
            assets = n_assets,
            base_seed,
            retained_paths = n_retained,
            parallel,
            "starting portfolio simulation"
        );

        if token.is_cancelled() {
            warn!("simulation cancelled before the first scenario");
            return Ok(SimulationRun::Cancelled {
                completed: 0,
                requested: n_scenarios,
            });
        }

        let started = Instant::now();
        let completed = AtomicUsize::new(0);
        let run_one = |buffers: &mut ScenarioBuffers, scenario: usize| {
            if token.is_cancelled() {
                return None;
            }
            let outcome = simulate_scenario(
                &sampler,
                weights,
                ScenarioRng::for_scenario(base_seed, scenario),
                n_days,
                capital,
                scenario < n_retained,
                buffers,
            );
            completed.fetch_add(1, Ordering::Relaxed);
            Some(outcome)
        };

        let outcomes: Option<Vec<ScenarioOutcome>> = if parallel {
            (0..n_scenarios)
                .into_par_iter()
                .map_init(|| ScenarioBuffers::new(n_assets), run_one)
                .collect()
        } else {
            let mut buffers = ScenarioBuffers::new(n_assets);
            (0..n_scenarios)
                .map(|scenario| run_one(&mut buffers, scenario))
                .collect()
        };

        let Some(outcomes) = outcomes else {
            let completed = completed.load(Ordering::Relaxed);
            warn!(completed, requested = n_scenarios, "simulation cancelled");
            return Ok(SimulationRun::Cancelled {
                completed,
                requested: n_scenarios,
            });
        };

        let mut ending_values = Vec::with_capacity(n_scenarios);
        let mut rows = Vec::with_capacity(n_retained);
        for outcome in outcomes {
            ending_values.push(outcome.ending);
            rows.extend(outcome.path);
        }

        let non_finite = ending_values.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(non_finite, "scenarios ended with non-finite portfolio values");
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "portfolio simulation complete"
        );

        Ok(SimulationRun::Complete(SimulationResult::new(
            &self.config,
            base_seed,
            ending_values,
            PathMatrix::from_rows(rows, n_days + 1),
        )))
    }
}

/// Runs one scenario from day 0 to day `n_days`.
fn simulate_scenario(
    sampler: &CorrelationSampler,
    weights: &Weights,
    mut rng: ScenarioRng,
    n_days: usize,
    capital: f64,
    retain_path: bool,
    buffers: &mut ScenarioBuffers,
) -> ScenarioOutcome {
    let mut path = retain_path.then(|| {
        let mut path = Vec::with_capacity(n_days + 1);
        path.push(capital);
        path
    });

    let mut value = capital;
    for _ in 0..n_days {
        sampler.sample_into(&mut rng, &mut buffers.z, &mut buffers.shock);
        value *= 1.0 + weights.dot(&buffers.shock);
        if let Some(path) = path.as_mut() {
            path.push(value);
        }
    }

    debug!(seed = rng.seed(), ending = value, "scenario finished");
    ScenarioOutcome {
        ending: value,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathRetention;
    use forecast_core::{CovarianceMatrix, MeanVector, WeightPolicy};

    fn example_stats() -> MarketStatistics {
        MarketStatistics::from_parts(
            MeanVector::new(vec![0.0005, 0.0003]),
            CovarianceMatrix::new(vec![0.0004, 0.0001, 0.0001, 0.0009], 2).unwrap(),
        )
        .unwrap()
    }

    fn example_weights() -> Weights {
        Weights::new(vec![0.6, 0.4], WeightPolicy::FullyInvested).unwrap()
    }

    fn config(scenarios: usize, days: usize) -> SimulationConfig {
        SimulationConfig::builder()
            .n_scenarios(scenarios)
            .n_days(days)
            .starting_capital(10_000.0)
            .seed(42)
            .build()
            .unwrap()
    }

    fn run(config: SimulationConfig) -> SimulationResult {
        PathSimulator::new(config)
            .simulate(&example_stats(), &example_weights())
            .unwrap()
            .into_result()
            .unwrap()
    }

    #[test]
    fn test_day_zero_is_starting_capital() {
        let result = run(config(50, 20));
        for path in result.paths().iter() {
            assert_eq!(path[0], 10_000.0);
            assert_eq!(path.len(), 21);
        }
    }

    #[test]
    fn test_ending_values_match_paths() {
        let result = run(config(20, 30));
        for (s, path) in result.paths().iter().enumerate() {
            assert_eq!(path[30], result.ending_values()[s]);
        }
    }

    #[test]
    fn test_weight_count_mismatch_fails_fast() {
        let weights = Weights::equal(3).unwrap();
        let err = PathSimulator::new(config(10, 10))
            .simulate(&example_stats(), &weights)
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Data(forecast_core::DataError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_degenerate_covariance_fails_fast() {
        let stats = MarketStatistics::from_parts(
            MeanVector::new(vec![0.0, 0.0]),
            CovarianceMatrix::new(vec![0.0004, 0.0004, 0.0004, 0.0004], 2).unwrap(),
        )
        .unwrap();
        let err = PathSimulator::new(config(10, 10))
            .simulate(&stats, &example_weights())
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Decomposition(
                forecast_core::DecompositionError::NonPositiveSemidefinite { .. }
            )
        ));
    }

    #[test]
    fn test_ending_only_retention() {
        let config = SimulationConfig::builder()
            .n_scenarios(10)
            .n_days(5)
            .starting_capital(1.0)
            .seed(1)
            .path_retention(PathRetention::EndingOnly)
            .build()
            .unwrap();
        let result = run(config);
        assert_eq!(result.paths().n_paths(), 0);
        assert_eq!(result.ending_values().len(), 10);
        assert!(!result.has_all_paths());
    }

    #[test]
    fn test_sample_retention_keeps_prefix() {
        let full = run(config(10, 5));
        let sampled_config = SimulationConfig::builder()
            .n_scenarios(10)
            .n_days(5)
            .starting_capital(10_000.0)
            .seed(42)
            .path_retention(PathRetention::Sample(3))
            .build()
            .unwrap();
        let sampled = run(sampled_config);

        assert_eq!(sampled.paths().n_paths(), 3);
        for s in 0..3 {
            assert_eq!(sampled.paths().path(s), full.paths().path(s));
        }
        assert_eq!(sampled.ending_values(), full.ending_values());
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let run = PathSimulator::new(config(100, 10))
            .simulate_with_cancellation(&example_stats(), &example_weights(), &token)
            .unwrap();
        assert_eq!(
            run,
            SimulationRun::Cancelled {
                completed: 0,
                requested: 100
            }
        );
    }

    #[test]
    fn test_unseeded_run_records_seed() {
        let config = SimulationConfig::builder()
            .n_scenarios(5)
            .n_days(10)
            .starting_capital(100.0)
            .build()
            .unwrap();
        let first = run(config);

        let replay_config = SimulationConfig::builder()
            .n_scenarios(5)
            .n_days(10)
            .starting_capital(100.0)
            .seed(first.base_seed())
            .build()
            .unwrap();
        let replay = run(replay_config);
        assert_eq!(first.ending_values(), replay.ending_values());
    }

    #[test]
    fn test_negative_values_are_not_floored() {
        // A 2x leveraged short with huge variance goes negative quickly.
        let stats = MarketStatistics::from_parts(
            MeanVector::new(vec![0.0]),
            CovarianceMatrix::new(vec![1.0], 1).unwrap(),
        )
        .unwrap();
        let weights = Weights::new(vec![-2.0], WeightPolicy::Leveraged).unwrap();
        let result = PathSimulator::new(config(200, 5))
            .simulate(&stats, &weights)
            .unwrap()
            .into_result()
            .unwrap();
        assert!(result.ending_values().iter().any(|v| *v < 0.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn test_execution_mode_does_not_change_paths(
                seed in any::<u64>(),
                scenarios in 1usize..40,
                days in 1usize..20,
            ) {
                let build = |threshold| {
                    SimulationConfig::builder()
                        .n_scenarios(scenarios)
                        .n_days(days)
                        .starting_capital(500.0)
                        .seed(seed)
                        .parallel_threshold(threshold)
                        .build()
                        .unwrap()
                };
                let sequential = run(build(usize::MAX));
                let parallel = run(build(1));

                prop_assert_eq!(&sequential, &parallel);
                prop_assert!(sequential.paths().day_values(0).iter().all(|v| *v == 500.0));
            }
        }
    }
}
