//! Error types for historical data and portfolio weights.
//!
//! This module provides:
//! - `DataError`: Errors raised while validating historical returns,
//!   price series and weight vectors

use thiserror::Error;

/// Categorised input data errors.
///
/// Raised eagerly when historical data or weights are constructed, before
/// any estimation or simulation work begins.
///
/// # Examples
/// ```
/// use forecast_core::types::DataError;
///
/// let err = DataError::InsufficientData { observations: 1 };
/// assert_eq!(
///     format!("{}", err),
///     "Insufficient data: 1 observation(s), at least 2 required"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// Fewer than two daily observations were supplied.
    #[error("Insufficient data: {observations} observation(s), at least 2 required")]
    InsufficientData {
        /// Number of observations supplied.
        observations: usize,
    },

    /// The return matrix has no asset columns.
    #[error("No assets: return matrix must have at least one column")]
    NoAssets,

    /// A row does not have the same number of columns as the first row.
    #[error("Ragged row {row}: expected {expected} columns, got {got}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Expected column count.
        expected: usize,
        /// Actual column count.
        got: usize,
    },

    /// A value is NaN or infinite.
    #[error("Non-finite value at row {row}, column {column}")]
    NonFiniteValue {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },

    /// A price is zero or negative, so no return can be derived from it.
    #[error("Non-positive price at row {row}, column {column}")]
    NonPositivePrice {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },

    /// Asset identifiers do not match the number of columns.
    #[error("Asset count mismatch: {identifiers} identifier(s) for {columns} column(s)")]
    AssetCountMismatch {
        /// Number of identifiers supplied.
        identifiers: usize,
        /// Number of columns in the matrix.
        columns: usize,
    },

    /// Weight vector is inconsistent with the asset count or weight policy.
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),
}

impl DataError {
    /// Create an invalid weights error
    pub fn invalid_weights(msg: impl Into<String>) -> Self {
        Self::InvalidWeights(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_display() {
        let err = DataError::RaggedRow {
            row: 3,
            expected: 2,
            got: 1,
        };
        assert!(err.to_string().contains("Ragged row 3"));

        let err = DataError::invalid_weights("sum is 0.9");
        assert_eq!(err.to_string(), "Invalid weights: sum is 0.9");

        let err = DataError::NonFiniteValue { row: 0, column: 1 };
        assert!(err.to_string().contains("column 1"));
    }
}
