//! Input data types for the forecasting engine.
//!
//! - [`HistoricalReturns`]: validated T × N matrix of daily simple returns
//! - [`Weights`] / [`WeightPolicy`]: portfolio weights and leverage policy
//! - [`DataError`]: validation failures for the above

mod error;
mod returns;
mod weights;

pub use error::DataError;
pub use returns::{HistoricalReturns, MIN_OBSERVATIONS};
pub use weights::{WeightPolicy, Weights, WEIGHT_SUM_TOLERANCE};
