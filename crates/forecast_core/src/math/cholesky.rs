//! Cholesky decomposition of covariance matrices.
//!
//! ## Mathematical Background
//!
//! Given `n` independent standard normal variables `Z = [Z1, ..., Zn]` and a
//! covariance matrix `Σ = L Lᵀ`, the vector
//!
//! ```text
//! X = μ + L Z
//! ```
//!
//! has mean `μ` and covariance `Σ`. The factor is computed once per run and
//! shared read-only by every scenario.
//!
//! ## Degenerate Matrices
//!
//! Historical data regularly produces singular covariance matrices: two
//! tracking funds with identical returns, or an asset that never moves.
//! The decomposition rejects any pivot that is negative, non-finite or not
//! strictly above `PIVOT_TOLERANCE × max(Σᵢᵢ)` with
//! [`DecompositionError::NonPositiveSemidefinite`]. Pivots are never clamped.

use num_traits::Float;
use thiserror::Error;

use super::matrix::CovarianceMatrix;

/// Relative tolerance below which a Cholesky pivot counts as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Error types for covariance decomposition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecompositionError {
    /// A pivot was negative, non-finite or numerically zero.
    #[error("Covariance matrix is not positive definite: pivot {pivot:e} at index {index}")]
    NonPositiveSemidefinite {
        /// Row at which the decomposition failed.
        index: usize,
        /// Remaining diagonal value `Σᵢᵢ − Σₖ Lᵢₖ²` at that row.
        pivot: f64,
    },

    /// Matrix or vector dimensions are inconsistent.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    DimensionMismatch {
        /// Expected element count.
        expected: usize,
        /// Supplied element count.
        got: usize,
    },

    /// Matrix is not symmetric.
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },
}

/// Computes the lower-triangular Cholesky factor of a row-major matrix.
///
/// On failure returns the failing row and its pivot.
fn decompose_lower<T: Float>(a: &[T], n: usize, tolerance: T) -> Result<Vec<T>, (usize, T)> {
    let mut lower = vec![T::zero(); n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::zero();
            for k in 0..j {
                sum = sum + lower[i * n + k] * lower[j * n + k];
            }

            if j == i {
                let pivot = a[i * n + i] - sum;
                if !pivot.is_finite() || pivot <= tolerance {
                    return Err((i, pivot));
                }
                lower[i * n + i] = pivot.sqrt();
            } else {
                lower[i * n + j] = (a[i * n + j] - sum) / lower[j * n + j];
            }
        }
    }

    Ok(lower)
}

/// Lower-triangular Cholesky factor of a covariance matrix.
///
/// Used to transform independent standard normals into correlated shocks.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower triangular matrix elements (row-major)
    data: Vec<f64>,
    /// Matrix dimension
    dim: usize,
}

impl CholeskyFactor {
    /// Decomposes `cov` into L with L·Lᵀ = cov.
    ///
    /// # Errors
    ///
    /// `NonPositiveSemidefinite` with the failing index and pivot.
    pub fn decompose(cov: &CovarianceMatrix) -> Result<Self, DecompositionError> {
        let n = cov.dim();
        let max_diag = (0..n)
            .map(|i| cov.variance(i).abs())
            .fold(0.0_f64, f64::max);
        let tolerance = PIVOT_TOLERANCE * max_diag;

        let data = decompose_lower(cov.as_slice(), n, tolerance).map_err(|(index, pivot)| {
            tracing::debug!(index, pivot, "cholesky pivot rejected");
            DecompositionError::NonPositiveSemidefinite { index, pivot }
        })?;

        Ok(Self { data, dim: n })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j); zero above the diagonal.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Computes `out = L · z`.
    ///
    /// # Panics
    ///
    /// Panics if `z` or `out` is shorter than the matrix dimension.
    #[inline]
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        let n = self.dim;
        assert!(
            z.len() >= n && out.len() >= n,
            "Input vector length {} is less than matrix dimension {}",
            z.len().min(out.len()),
            n
        );

        for i in 0..n {
            let row = &self.data[i * n..i * n + i + 1];
            out[i] = row.iter().zip(z).map(|(l, zj)| l * zj).sum();
        }
    }

    /// Rebuilds L·Lᵀ, mainly for verification.
    pub fn reconstruct(&self) -> Vec<f64> {
        let n = self.dim;
        let mut out = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                out[i * n + j] = (0..=i.min(j)).map(|k| self.get(i, k) * self.get(j, k)).sum();
            }
        }
        out
    }
}
