//! Portfolio weights and the policy they are validated against.

use serde::{Deserialize, Serialize};

use super::error::DataError;

/// Tolerance on the weight sum for fully-invested portfolios.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Declared leverage policy for a weight vector.
///
/// The simulated portfolio return is always `Σ wᵢ · shockᵢ` applied to the
/// whole portfolio value; the policy only decides which vectors are accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Long-only, weights sum to one.
    #[default]
    FullyInvested,
    /// Short positions and gross exposure other than one are allowed.
    /// The weight sum must still be non-zero.
    Leveraged,
}

/// Validated, immutable portfolio weights.
///
/// # Examples
///
/// ```rust
/// use forecast_core::types::{WeightPolicy, Weights};
///
/// let weights = Weights::new(vec![0.6, 0.4], WeightPolicy::FullyInvested).unwrap();
/// assert_eq!(weights.len(), 2);
///
/// let equal = Weights::equal(4).unwrap();
/// assert_eq!(equal.as_slice(), &[0.25, 0.25, 0.25, 0.25]);
///
/// assert!(Weights::new(vec![0.5, 0.4], WeightPolicy::FullyInvested).is_err());
/// assert!(Weights::new(vec![1.5, -0.5], WeightPolicy::Leveraged).is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Weights {
    values: Vec<f64>,
    policy: WeightPolicy,
}

impl Weights {
    /// Validates `values` against `policy`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWeights` if the vector is empty, contains a
    /// non-finite value, or violates the policy.
    pub fn new(values: Vec<f64>, policy: WeightPolicy) -> Result<Self, DataError> {
        if values.is_empty() {
            return Err(DataError::invalid_weights("weight vector is empty"));
        }
        if let Some(i) = values.iter().position(|w| !w.is_finite()) {
            return Err(DataError::invalid_weights(format!(
                "weight {} is not finite",
                i
            )));
        }

        let sum: f64 = values.iter().sum();
        match policy {
            WeightPolicy::FullyInvested => {
                if let Some(i) = values.iter().position(|&w| w < 0.0) {
                    return Err(DataError::invalid_weights(format!(
                        "weight {} is negative ({}) under a fully-invested policy",
                        i, values[i]
                    )));
                }
                if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                    return Err(DataError::invalid_weights(format!(
                        "weights sum to {} under a fully-invested policy, expected 1",
                        sum
                    )));
                }
            }
            WeightPolicy::Leveraged => {
                if sum == 0.0 {
                    return Err(DataError::invalid_weights("weights sum to zero"));
                }
            }
        }

        Ok(Self { values, policy })
    }

    /// Equally-weighted, fully-invested portfolio over `n_assets` assets.
    pub fn equal(n_assets: usize) -> Result<Self, DataError> {
        if n_assets == 0 {
            return Err(DataError::invalid_weights("weight vector is empty"));
        }
        let w = 1.0 / n_assets as f64;
        Ok(Self {
            values: vec![w; n_assets],
            policy: WeightPolicy::FullyInvested,
        })
    }

    /// Checks that there is exactly one weight per asset.
    pub fn ensure_len(&self, n_assets: usize) -> Result<(), DataError> {
        if self.values.len() != n_assets {
            return Err(DataError::invalid_weights(format!(
                "{} weight(s) supplied for {} asset(s)",
                self.values.len(),
                n_assets
            )));
        }
        Ok(())
    }

    /// Number of weights.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; empty weight vectors are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Policy the weights were validated against.
    #[inline]
    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    /// Weight values in asset order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Weighted sum `Σ wᵢ · xᵢ`.
    #[inline]
    pub fn dot(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.values.len());
        self.values.iter().zip(x).map(|(w, v)| w * v).sum()
    }
}
