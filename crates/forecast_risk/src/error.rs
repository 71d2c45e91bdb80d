//! Summary error types.

use thiserror::Error;

/// Errors raised while summarising simulated outcomes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    /// No scenarios to summarise.
    #[error("Cannot summarise an empty simulation")]
    EmptySimulation,

    /// Percentile outside [0, 100] or NaN.
    #[error("Invalid percentile {0}: must be within [0, 100]")]
    InvalidPercentile(f64),

    /// Loss threshold is not finite.
    #[error("Invalid threshold {0}: must be finite")]
    InvalidThreshold(f64),

    /// Per-day bands need the path of every scenario.
    #[error("Paths not retained: {retained} of {scenarios} scenario paths available")]
    PathsNotRetained {
        /// Retained paths.
        retained: usize,
        /// Scenarios in the run.
        scenarios: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SummaryError::InvalidPercentile(101.0).to_string(),
            "Invalid percentile 101: must be within [0, 100]"
        );
        assert_eq!(
            SummaryError::PathsNotRetained {
                retained: 10,
                scenarios: 1000
            }
            .to_string(),
            "Paths not retained: 10 of 1000 scenario paths available"
        );
    }
}
