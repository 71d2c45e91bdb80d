//! Per-day percentile bands over retained paths.
//!
//! A band is the `p`-th percentile of portfolio value taken across all
//! scenarios on each day, giving the fan chart of a forecast. Days are
//! independent and are processed on the rayon pool.

use forecast_engine::SimulationResult;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::SummaryError;
use crate::quantile::{interpolate, sorted, validate_percentile};

/// Percentile bands: one value per requested percentile per day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PercentileBands {
    percentiles: Vec<f64>,
    /// `bands[k][day]` is percentile `percentiles[k]` on `day`.
    bands: Vec<Vec<f64>>,
}

impl PercentileBands {
    /// Requested percentiles, in request order.
    #[inline]
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    /// Number of days covered, day 0 included.
    #[inline]
    pub fn n_points(&self) -> usize {
        self.bands.first().map_or(0, Vec::len)
    }

    /// Band of the `index`-th requested percentile.
    #[inline]
    pub fn band(&self, index: usize) -> Option<&[f64]> {
        self.bands.get(index).map(Vec::as_slice)
    }

    /// Iterates over `(percentile, band)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.percentiles
            .iter()
            .copied()
            .zip(self.bands.iter().map(Vec::as_slice))
    }
}

/// Computes percentile bands of a run whose paths were all retained.
///
/// # Errors
///
/// - `InvalidPercentile` for a percentile outside [0, 100] or NaN
/// - `EmptySimulation` for a run without scenarios
/// - `PathsNotRetained` unless every scenario path was retained
///
/// # Examples
///
/// ```rust
/// use forecast_core::{CovarianceMatrix, MarketStatistics, MeanVector, Weights};
/// use forecast_engine::{PathSimulator, SimulationConfig};
/// use forecast_risk::percentile_bands;
///
/// let stats = MarketStatistics::from_parts(
///     MeanVector::new(vec![0.0004]),
///     CovarianceMatrix::new(vec![0.0001], 1).unwrap(),
/// )
/// .unwrap();
/// let config = SimulationConfig::builder()
///     .n_scenarios(200)
///     .n_days(10)
///     .starting_capital(100.0)
///     .seed(3)
///     .build()
///     .unwrap();
/// let result = PathSimulator::new(config)
///     .simulate(&stats, &Weights::equal(1).unwrap())
///     .unwrap()
///     .into_result()
///     .unwrap();
///
/// let bands = percentile_bands(&result, &[5.0, 50.0, 95.0]).unwrap();
/// assert_eq!(bands.n_points(), 11);
/// assert_eq!(bands.band(0).unwrap()[0], 100.0);
/// ```
pub fn percentile_bands(
    result: &SimulationResult,
    percentiles: &[f64],
) -> Result<PercentileBands, SummaryError> {
    for &p in percentiles {
        validate_percentile(p)?;
    }
    if result.n_scenarios() == 0 {
        return Err(SummaryError::EmptySimulation);
    }
    if !result.has_all_paths() {
        return Err(SummaryError::PathsNotRetained {
            retained: result.paths().n_paths(),
            scenarios: result.n_scenarios(),
        });
    }

    let paths = result.paths();
    let per_day: Vec<Vec<f64>> = (0..paths.path_len())
        .into_par_iter()
        .map(|day| {
            let day_sorted = sorted(&paths.day_values(day));
            percentiles
                .iter()
                .map(|&p| interpolate(&day_sorted, p))
                .collect()
        })
        .collect();

    let bands = (0..percentiles.len())
        .map(|k| per_day.iter().map(|row| row[k]).collect())
        .collect();

    Ok(PercentileBands {
        percentiles: percentiles.to_vec(),
        bands,
    })
}
