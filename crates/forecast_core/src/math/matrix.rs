//! Estimated moment types: per-asset mean vector and covariance matrix.

use serde::Serialize;

use super::cholesky::{CholeskyFactor, DecompositionError};

/// Per-asset sample mean of daily returns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeanVector {
    values: Vec<f64>,
}

impl MeanVector {
    /// Wraps per-asset means.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of assets.
    #[inline]
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Mean return of `asset`.
    #[inline]
    pub fn get(&self, asset: usize) -> f64 {
        self.values[asset]
    }

    /// Means in asset order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Symmetric N × N covariance matrix in row-major order.
///
/// # Examples
///
/// ```rust
/// use forecast_core::math::CovarianceMatrix;
///
/// let cov = CovarianceMatrix::new(vec![0.0004, 0.0001, 0.0001, 0.0009], 2).unwrap();
/// assert_eq!(cov.get(1, 0), 0.0001);
///
/// let l = cov.cholesky().unwrap();
/// assert!((l.get(0, 0) - 0.02).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CovarianceMatrix {
    /// Matrix elements in row-major order
    data: Vec<f64>,
    /// Matrix dimension (n x n)
    dim: usize,
}

impl CovarianceMatrix {
    /// Creates a covariance matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `data.len() != dim * dim` or `dim == 0`
    /// - `NotSymmetric` if `data[i][j]` and `data[j][i]` differ by more than
    ///   `1e-12` relative to the largest diagonal entry
    pub fn new(data: Vec<f64>, dim: usize) -> Result<Self, DecompositionError> {
        let expected = dim * dim;
        if dim == 0 || data.len() != expected {
            return Err(DecompositionError::DimensionMismatch {
                expected,
                got: data.len(),
            });
        }

        let scale = (0..dim)
            .map(|i| data[i * dim + i].abs())
            .fold(0.0_f64, f64::max)
            .max(f64::MIN_POSITIVE);
        for i in 0..dim {
            for j in (i + 1)..dim {
                if (data[i * dim + j] - data[j * dim + i]).abs() > 1e-12 * scale {
                    return Err(DecompositionError::NotSymmetric { i, j });
                }
            }
        }

        Ok(Self { data, dim })
    }

    /// Builds a matrix from an upper triangle computed by the caller,
    /// mirroring it so that symmetry holds exactly.
    pub(crate) fn from_upper(mut data: Vec<f64>, dim: usize) -> Self {
        for i in 0..dim {
            for j in 0..i {
                data[i * dim + j] = data[j * dim + i];
            }
        }
        Self { data, dim }
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Variance of `asset`.
    #[inline]
    pub fn variance(&self, asset: usize) -> f64 {
        self.get(asset, asset)
    }

    /// Row-major elements.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Rows as owned vectors, convenient for reporting.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks_exact(self.dim).map(<[f64]>::to_vec).collect()
    }

    /// Portfolio variance `wᵀ Σ w`.
    pub fn quadratic_form(&self, w: &[f64]) -> f64 {
        debug_assert_eq!(w.len(), self.dim);
        let n = self.dim;
        let mut total = 0.0;
        for i in 0..n {
            let row = &self.data[i * n..(i + 1) * n];
            let inner: f64 = row.iter().zip(w).map(|(c, wj)| c * wj).sum();
            total += w[i] * inner;
        }
        total
    }

    /// Computes the lower-triangular Cholesky factor L with L·Lᵀ = Σ.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveSemidefinite` when a pivot is negative, non-finite,
    /// or numerically zero (singular matrix, e.g. duplicated asset columns).
    pub fn cholesky(&self) -> Result<CholeskyFactor, DecompositionError> {
        CholeskyFactor::decompose(self)
    }
}
