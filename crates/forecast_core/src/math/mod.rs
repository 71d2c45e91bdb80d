//! Moment types and linear algebra.
//!
//! - [`MeanVector`] / [`CovarianceMatrix`]: estimated first and second moments
//! - [`CholeskyFactor`]: lower-triangular factor used to correlate shocks

pub mod cholesky;
pub mod matrix;

pub use cholesky::{CholeskyFactor, DecompositionError, PIVOT_TOLERANCE};
pub use matrix::{CovarianceMatrix, MeanVector};
