//! # forecast_core: Data and Mathematical Foundation
//!
//! ## Layer 1 (Foundation) Role
//!
//! forecast_core is the bottom layer of the forecasting workspace, providing:
//! - Validated historical return matrices and price-to-return conversion (`types`)
//! - Portfolio weights with an explicit leverage policy (`types`)
//! - Mean vector / covariance estimation with an explicit denominator (`statistics`)
//! - Cholesky decomposition with first-class degenerate-matrix errors (`math`)
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_core::statistics::{estimate, CovarianceDenominator};
//! use forecast_core::types::{HistoricalReturns, Weights};
//!
//! let returns = HistoricalReturns::new(vec![
//!     vec![0.010, -0.004],
//!     vec![-0.003, 0.006],
//!     vec![0.007, 0.001],
//! ])
//! .unwrap();
//!
//! let stats = estimate(&returns, CovarianceDenominator::Sample).unwrap();
//! let factor = stats.covariance.cholesky().unwrap();
//! let weights = Weights::equal(returns.n_assets()).unwrap();
//!
//! assert_eq!(factor.dim(), weights.len());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod math;
pub mod statistics;
pub mod types;

pub use math::{CholeskyFactor, CovarianceMatrix, DecompositionError, MeanVector};
pub use statistics::{estimate, CovarianceDenominator, MarketStatistics};
pub use types::{DataError, HistoricalReturns, WeightPolicy, Weights};
