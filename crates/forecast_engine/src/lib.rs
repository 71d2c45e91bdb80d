//! # forecast_engine: Monte Carlo Path Simulation
//!
//! ## Layer 2 Role
//!
//! forecast_engine turns market statistics from `forecast_core` into
//! simulated portfolio value paths:
//! - Per-scenario seeded normal streams (`rng`)
//! - Correlated daily shocks `μ + L·z` (`sampler`)
//! - Compounded portfolio paths, sequential or on the rayon pool (`simulator`)
//! - Validated run configuration and path retention policy (`config`)
//! - Cooperative cancellation at scenario boundaries (`cancel`)
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_core::{HistoricalReturns, Weights};
//! use forecast_engine::{PathSimulator, SimulationConfig};
//!
//! let returns = HistoricalReturns::new(vec![
//!     vec![0.010, -0.004],
//!     vec![-0.003, 0.006],
//!     vec![0.007, 0.001],
//!     vec![0.002, -0.002],
//! ])
//! .unwrap();
//! let weights = Weights::equal(2).unwrap();
//!
//! let config = SimulationConfig::builder()
//!     .n_scenarios(500)
//!     .n_days(21)
//!     .starting_capital(1_000.0)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let result = PathSimulator::new(config)
//!     .simulate_from_returns(&returns, &weights)
//!     .unwrap()
//!     .into_result()
//!     .unwrap();
//!
//! assert_eq!(result.n_scenarios(), 500);
//! assert_eq!(result.base_seed(), 7);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod result;
pub mod rng;
pub mod sampler;
pub mod simulator;

pub use cancel::CancellationToken;
pub use config::{PathRetention, SimulationConfig, SimulationConfigBuilder};
pub use error::{ConfigError, SimulationError};
pub use result::{PathMatrix, SimulationResult, SimulationRun};
pub use sampler::CorrelationSampler;
pub use simulator::PathSimulator;
