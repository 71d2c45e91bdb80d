//! Correlation sampler: turns independent normals into correlated shocks.
//!
//! ```text
//! shock = μ + L · z,    z ~ N(0, I)
//! ```
//!
//! The Cholesky factor `L` is computed once in [`CorrelationSampler::from_statistics`]
//! and then only read, so a single sampler is shared by reference across
//! all worker threads.

use forecast_core::{CholeskyFactor, DecompositionError, MarketStatistics, MeanVector};

use crate::rng::ScenarioRng;

/// Correlated daily shock generator.
///
/// # Examples
///
/// ```rust
/// use forecast_core::{CovarianceMatrix, MarketStatistics, MeanVector};
/// use forecast_engine::rng::ScenarioRng;
/// use forecast_engine::sampler::CorrelationSampler;
///
/// let stats = MarketStatistics::from_parts(
///     MeanVector::new(vec![0.0005, 0.0003]),
///     CovarianceMatrix::new(vec![0.0004, 0.0001, 0.0001, 0.0009], 2).unwrap(),
/// )
/// .unwrap();
///
/// let sampler = CorrelationSampler::from_statistics(&stats).unwrap();
/// let mut rng = ScenarioRng::from_seed(42);
/// let (mut z, mut shock) = (vec![0.0; 2], vec![0.0; 2]);
/// sampler.sample_into(&mut rng, &mut z, &mut shock);
/// assert!(shock.iter().all(|s| s.is_finite()));
/// ```
#[derive(Clone, Debug)]
pub struct CorrelationSampler {
    mean: MeanVector,
    factor: CholeskyFactor,
}

impl CorrelationSampler {
    /// Builds a sampler from a mean vector and an existing factor.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the dimensions differ.
    pub fn new(mean: MeanVector, factor: CholeskyFactor) -> Result<Self, DecompositionError> {
        if mean.dim() != factor.dim() {
            return Err(DecompositionError::DimensionMismatch {
                expected: factor.dim(),
                got: mean.dim(),
            });
        }
        Ok(Self { mean, factor })
    }

    /// Decomposes the covariance of `stats` and builds a sampler.
    ///
    /// # Errors
    ///
    /// `NonPositiveSemidefinite` if the covariance cannot be decomposed.
    pub fn from_statistics(stats: &MarketStatistics) -> Result<Self, DecompositionError> {
        let factor = stats.covariance.cholesky()?;
        Self::new(stats.mean.clone(), factor)
    }

    /// Number of assets.
    #[inline]
    pub fn dim(&self) -> usize {
        self.mean.dim()
    }

    /// Mean vector μ.
    #[inline]
    pub fn mean(&self) -> &MeanVector {
        &self.mean
    }

    /// Cholesky factor L.
    #[inline]
    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    /// Computes `shock = μ + L · z` for a given draw `z`.
    #[inline]
    pub fn transform_into(&self, z: &[f64], shock: &mut [f64]) {
        self.factor.transform_into(z, shock);
        for (s, m) in shock.iter_mut().zip(self.mean.as_slice()) {
            *s += m;
        }
    }

    /// Draws `z` from `rng` and writes the correlated shock into `shock`.
    ///
    /// Both buffers must hold at least [`dim`](Self::dim) elements; `z` is
    /// left holding the independent draw.
    #[inline]
    pub fn sample_into(&self, rng: &mut ScenarioRng, z: &mut [f64], shock: &mut [f64]) {
        rng.fill_normal(&mut z[..self.dim()]);
        self.transform_into(z, shock);
    }
}
