//! Simulation output containers.
//!
//! # Memory Layout
//!
//! Retained paths are stored row-major:
//! `paths[scenario * (n_days + 1) + day]`, where `day = 0` holds the
//! starting capital. Retained rows are always the first scenarios of the
//! run, so row `k` is scenario `k`.

use serde::Serialize;

use crate::config::{PathRetention, SimulationConfig};

/// Retained value paths of a run (scenarios × (days + 1)).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl PathMatrix {
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>, n_cols: usize) -> Self {
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            debug_assert_eq!(row.len(), n_cols);
            data.extend(row);
        }
        Self {
            data,
            n_rows,
            n_cols,
        }
    }

    /// Number of retained scenarios.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_rows
    }

    /// Number of points per path (days + 1).
    #[inline]
    pub fn path_len(&self) -> usize {
        self.n_cols
    }

    /// Path of scenario `scenario`, if retained.
    #[inline]
    pub fn path(&self, scenario: usize) -> Option<&[f64]> {
        (scenario < self.n_rows)
            .then(|| &self.data[scenario * self.n_cols..(scenario + 1) * self.n_cols])
    }

    /// Iterates over retained paths in scenario order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact panics on a zero chunk size; paths always include day 0
        self.data.chunks_exact(self.n_cols.max(1))
    }

    /// Values of every retained path on `day`.
    pub fn day_values(&self, day: usize) -> Vec<f64> {
        self.iter().map(|path| path[day]).collect()
    }

    /// Row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Output of a completed simulation run.
///
/// Holds the ending value of every scenario, the retained paths, and the
/// parameters needed to interpret and replay them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    n_scenarios: usize,
    n_days: usize,
    starting_capital: f64,
    base_seed: u64,
    path_retention: PathRetention,
    ending_values: Vec<f64>,
    paths: PathMatrix,
}

impl SimulationResult {
    pub(crate) fn new(
        config: &SimulationConfig,
        base_seed: u64,
        ending_values: Vec<f64>,
        paths: PathMatrix,
    ) -> Self {
        Self {
            n_scenarios: config.n_scenarios(),
            n_days: config.n_days(),
            starting_capital: config.starting_capital(),
            base_seed,
            path_retention: config.path_retention(),
            ending_values,
            paths,
        }
    }

    /// Number of scenarios (S).
    #[inline]
    pub fn n_scenarios(&self) -> usize {
        self.n_scenarios
    }

    /// Number of simulated days (D).
    #[inline]
    pub fn n_days(&self) -> usize {
        self.n_days
    }

    /// Day-0 portfolio value.
    #[inline]
    pub fn starting_capital(&self) -> f64 {
        self.starting_capital
    }

    /// Base seed actually used; rerunning with it reproduces the result.
    #[inline]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Retention policy the run used.
    #[inline]
    pub fn path_retention(&self) -> PathRetention {
        self.path_retention
    }

    /// Final-day value of every scenario, in scenario order.
    #[inline]
    pub fn ending_values(&self) -> &[f64] {
        &self.ending_values
    }

    /// Retained value paths.
    #[inline]
    pub fn paths(&self) -> &PathMatrix {
        &self.paths
    }

    /// Whether the path of every scenario was retained.
    #[inline]
    pub fn has_all_paths(&self) -> bool {
        self.paths.n_paths() == self.n_scenarios
    }
}

/// Outcome of a run: complete, or stopped early by a cancellation request.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationRun {
    /// All scenarios finished.
    Complete(SimulationResult),
    /// Cancelled at a scenario boundary; partial output is discarded.
    Cancelled {
        /// Scenarios that had finished when the run stopped.
        completed: usize,
        /// Scenarios requested.
        requested: usize,
    },
}

impl SimulationRun {
    /// Whether the run was cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The result of a complete run.
    pub fn into_result(self) -> Option<SimulationResult> {
        match self {
            Self::Complete(result) => Some(result),
            Self::Cancelled { .. } => None,
        }
    }
}
