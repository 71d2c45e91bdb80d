//! Statistics estimator: sample mean vector and covariance matrix.
//!
//! # Denominator
//!
//! The covariance denominator is an explicit choice because it scales the
//! simulated variance by T/(T−1):
//!
//! | Variant | Denominator |
//! |---------|-------------|
//! | [`CovarianceDenominator::Sample`] (default) | T − 1 (unbiased) |
//! | [`CovarianceDenominator::Population`] | T |

use serde::{Deserialize, Serialize};

use crate::math::{CovarianceMatrix, MeanVector};
use crate::types::{DataError, HistoricalReturns, MIN_OBSERVATIONS};

/// Denominator used by the covariance estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceDenominator {
    /// Unbiased sample estimator, divides by T − 1.
    #[default]
    Sample,
    /// Population estimator, divides by T.
    Population,
}

impl CovarianceDenominator {
    /// Divisor for `n_obs` observations.
    #[inline]
    pub fn divisor(self, n_obs: usize) -> f64 {
        match self {
            Self::Sample => (n_obs - 1) as f64,
            Self::Population => n_obs as f64,
        }
    }
}

/// Mean vector and covariance matrix estimated from one return history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketStatistics {
    /// Per-asset mean daily return.
    pub mean: MeanVector,
    /// Asset covariance matrix.
    pub covariance: CovarianceMatrix,
    /// Number of observations the estimates are based on.
    pub n_observations: usize,
    /// Denominator used for the covariance.
    pub denominator: CovarianceDenominator,
}

impl MarketStatistics {
    /// Assembles statistics supplied directly by the caller.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the mean and covariance dimensions differ.
    pub fn from_parts(
        mean: MeanVector,
        covariance: CovarianceMatrix,
    ) -> Result<Self, crate::math::DecompositionError> {
        if mean.dim() != covariance.dim() {
            return Err(crate::math::DecompositionError::DimensionMismatch {
                expected: covariance.dim(),
                got: mean.dim(),
            });
        }
        Ok(Self {
            mean,
            covariance,
            n_observations: 0,
            denominator: CovarianceDenominator::default(),
        })
    }

    /// Number of assets.
    #[inline]
    pub fn n_assets(&self) -> usize {
        self.mean.dim()
    }

    /// Historical standard deviation of each asset.
    pub fn volatilities(&self) -> Vec<f64> {
        (0..self.n_assets())
            .map(|i| self.covariance.variance(i).sqrt())
            .collect()
    }
}

/// Estimates the mean vector and covariance matrix of `returns`.
///
/// Only the upper triangle is accumulated; the lower triangle is mirrored
/// so that `cov[i][j] == cov[j][i]` holds bit-for-bit.
///
/// # Errors
///
/// `InsufficientData` if fewer than two observations are available.
///
/// # Examples
///
/// ```rust
/// use forecast_core::statistics::{estimate, CovarianceDenominator};
/// use forecast_core::types::HistoricalReturns;
///
/// let returns = HistoricalReturns::new(vec![
///     vec![0.01, 0.02],
///     vec![0.03, 0.00],
/// ])
/// .unwrap();
///
/// let stats = estimate(&returns, CovarianceDenominator::Sample).unwrap();
/// assert!((stats.mean.get(0) - 0.02).abs() < 1e-15);
/// assert!((stats.covariance.get(0, 1) + 0.0002).abs() < 1e-15);
/// ```
pub fn estimate(
    returns: &HistoricalReturns,
    denominator: CovarianceDenominator,
) -> Result<MarketStatistics, DataError> {
    let t = returns.n_days();
    let n = returns.n_assets();
    if t < MIN_OBSERVATIONS {
        return Err(DataError::InsufficientData { observations: t });
    }

    let mut mean = vec![0.0; n];
    for row in returns.rows() {
        for (m, r) in mean.iter_mut().zip(row) {
            *m += r;
        }
    }
    for m in mean.iter_mut() {
        *m /= t as f64;
    }

    let mut cov = vec![0.0; n * n];
    let mut centred = vec![0.0; n];
    for row in returns.rows() {
        for ((c, r), m) in centred.iter_mut().zip(row).zip(&mean) {
            *c = r - m;
        }
        for i in 0..n {
            for j in i..n {
                cov[i * n + j] += centred[i] * centred[j];
            }
        }
    }

    let divisor = denominator.divisor(t);
    for i in 0..n {
        for j in i..n {
            cov[i * n + j] /= divisor;
        }
    }

    tracing::debug!(
        observations = t,
        assets = n,
        ?denominator,
        "estimated return statistics"
    );

    Ok(MarketStatistics {
        mean: MeanVector::new(mean),
        covariance: CovarianceMatrix::from_upper(cov, n),
        n_observations: t,
        denominator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_returns() -> HistoricalReturns {
        HistoricalReturns::new(vec![
            vec![0.010, -0.020, 0.003],
            vec![0.004, 0.015, -0.001],
            vec![-0.008, 0.007, 0.002],
            vec![0.012, -0.004, 0.000],
        ])
        .unwrap()
    }

    #[test]
    fn test_mean_is_column_average() {
        let stats = estimate(&sample_returns(), CovarianceDenominator::Sample).unwrap();
        assert_relative_eq!(stats.mean.get(0), 0.0045, epsilon = 1e-15);
        assert_relative_eq!(stats.mean.get(1), -0.0005, epsilon = 1e-15);
        assert_relative_eq!(stats.mean.get(2), 0.001, epsilon = 1e-15);
        assert_eq!(stats.n_observations, 4);
    }

    #[test]
    fn test_sample_variance_matches_manual() {
        let returns = sample_returns();
        let stats = estimate(&returns, CovarianceDenominator::Sample).unwrap();

        let col: Vec<f64> = returns.column(0).collect();
        let m = col.iter().sum::<f64>() / 4.0;
        let var = col.iter().map(|x| (x - m).powi(2)).sum::<f64>() / 3.0;
        assert_relative_eq!(stats.covariance.variance(0), var, epsilon = 1e-15);
    }

    #[test]
    fn test_population_scales_by_t_over_t_minus_one() {
        let returns = sample_returns();
        let sample = estimate(&returns, CovarianceDenominator::Sample).unwrap();
        let population = estimate(&returns, CovarianceDenominator::Population).unwrap();

        for (s, p) in sample
            .covariance
            .as_slice()
            .iter()
            .zip(population.covariance.as_slice())
        {
            assert_relative_eq!(s * 3.0 / 4.0, *p, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_duplicate_columns_give_identical_entries() {
        let returns = HistoricalReturns::new(vec![
            vec![0.01, 0.01],
            vec![-0.02, -0.02],
            vec![0.005, 0.005],
        ])
        .unwrap();
        let stats = estimate(&returns, CovarianceDenominator::Sample).unwrap();
        let c = &stats.covariance;
        assert_eq!(c.get(0, 0), c.get(0, 1));
        assert_eq!(c.get(0, 0), c.get(1, 1));
    }

    #[test]
    fn test_from_parts_dimension_check() {
        let mean = MeanVector::new(vec![0.0, 0.0]);
        let cov = CovarianceMatrix::new(vec![1.0], 1).unwrap();
        assert!(MarketStatistics::from_parts(mean, cov).is_err());
    }

    #[test]
    fn test_volatilities() {
        let mean = MeanVector::new(vec![0.0005, 0.0003]);
        let cov = CovarianceMatrix::new(vec![0.0004, 0.0001, 0.0001, 0.0009], 2).unwrap();
        let stats = MarketStatistics::from_parts(mean, cov).unwrap();
        let vols = stats.volatilities();
        assert_relative_eq!(vols[0], 0.02, epsilon = 1e-15);
        assert_relative_eq!(vols[1], 0.03, epsilon = 1e-15);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn returns_strategy() -> impl Strategy<Value = HistoricalReturns> {
            (1usize..6, 2usize..40).prop_flat_map(|(n, t)| {
                prop::collection::vec(-0.1_f64..0.1, n * t)
                    .prop_map(move |data| HistoricalReturns::from_flat(data, n).unwrap())
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn test_covariance_is_symmetric(returns in returns_strategy()) {
                let stats = estimate(&returns, CovarianceDenominator::Sample).unwrap();
                let n = returns.n_assets();
                for i in 0..n {
                    for j in 0..n {
                        prop_assert_eq!(stats.covariance.get(i, j), stats.covariance.get(j, i));
                    }
                }
            }

            #[test]
            fn test_variances_are_non_negative(returns in returns_strategy()) {
                let stats = estimate(&returns, CovarianceDenominator::Population).unwrap();
                for i in 0..returns.n_assets() {
                    prop_assert!(stats.covariance.variance(i) >= 0.0);
                }
            }
        }
    }
}
