//! # forecast_risk: Outcome Analysis
//!
//! ## Layer 3 Role
//!
//! forecast_risk turns simulated runs from `forecast_engine` into the
//! figures a forecast is read by:
//! - Ending value percentiles, moments and loss/profit probabilities (`summary`)
//! - Per-day percentile bands for fan charts (`bands`)
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_core::{CovarianceMatrix, MarketStatistics, MeanVector, Weights};
//! use forecast_engine::{PathSimulator, SimulationConfig};
//! use forecast_risk::{OutcomeSummarizer, SummaryConfig};
//!
//! let stats = MarketStatistics::from_parts(
//!     MeanVector::new(vec![0.0005, 0.0003]),
//!     CovarianceMatrix::new(vec![0.0004, 0.0001, 0.0001, 0.0009], 2).unwrap(),
//! )
//! .unwrap();
//! let config = SimulationConfig::builder()
//!     .n_scenarios(1_000)
//!     .n_days(252)
//!     .starting_capital(10_000.0)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let result = PathSimulator::new(config)
//!     .simulate(&stats, &Weights::equal(2).unwrap())
//!     .unwrap()
//!     .into_result()
//!     .unwrap();
//!
//! let report = OutcomeSummarizer::new(SummaryConfig::default())
//!     .summarize(&result)
//!     .unwrap();
//! assert!(report.percentile(1.0).unwrap() <= report.percentile(50.0).unwrap());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod bands;
pub mod error;
mod quantile;
pub mod summary;

pub use bands::{percentile_bands, PercentileBands};
pub use error::SummaryError;
pub use summary::{
    DownsideLevel, OutcomeSummarizer, PercentileValue, SummaryConfig, SummaryConfigBuilder,
    SummaryReport, DEFAULT_PERCENTILES,
};
