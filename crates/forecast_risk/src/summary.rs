//! Outcome summarizer.
//!
//! Reduces the ending values of a run to a [`SummaryReport`]: percentiles,
//! central moments, the probability of ending below a threshold, and the
//! probability of ending above the starting capital.
//!
//! Non-finite ending values are kept. They are counted in
//! [`SummaryReport::non_finite`] and flow into the moments unchanged.
//! Serialised reports write non-finite values as the strings `"inf"`,
//! `"-inf"` and `"NaN"`, since JSON has no number for them.

use std::fmt;

use forecast_engine::SimulationResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SummaryError;
use crate::quantile::{interpolate, sorted, validate_percentile};

/// Percentiles reported when none are configured.
pub const DEFAULT_PERCENTILES: [f64; 3] = [1.0, 5.0, 50.0];

/// Summary configuration.
///
/// # Examples
///
/// ```rust
/// use forecast_risk::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .percentiles(vec![5.0, 50.0, 95.0])
///     .threshold(9_000.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.percentiles(), &[5.0, 50.0, 95.0]);
/// assert_eq!(config.threshold(), Some(9_000.0));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    percentiles: Vec<f64>,
    threshold: Option<f64>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            threshold: None,
        }
    }
}

impl SummaryConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder::default()
    }

    /// Requested percentiles, in request order.
    #[inline]
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    /// Loss threshold; `None` means the starting capital.
    #[inline]
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidPercentile` for a percentile outside [0, 100] or NaN
    /// - `InvalidThreshold` for a non-finite threshold
    pub fn validate(&self) -> Result<(), SummaryError> {
        for &p in &self.percentiles {
            validate_percentile(p)?;
        }
        if let Some(threshold) = self.threshold {
            if !threshold.is_finite() {
                return Err(SummaryError::InvalidThreshold(threshold));
            }
        }
        Ok(())
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Clone, Debug, Default)]
pub struct SummaryConfigBuilder {
    percentiles: Option<Vec<f64>>,
    threshold: Option<f64>,
}

impl SummaryConfigBuilder {
    /// Sets the percentiles to report (each in [0, 100]).
    #[inline]
    pub fn percentiles(mut self, percentiles: Vec<f64>) -> Self {
        self.percentiles = Some(percentiles);
        self
    }

    /// Sets the loss threshold.
    #[inline]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Sets or clears the loss threshold.
    #[inline]
    pub fn maybe_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<SummaryConfig, SummaryError> {
        let config = SummaryConfig {
            percentiles: self
                .percentiles
                .unwrap_or_else(|| DEFAULT_PERCENTILES.to_vec()),
            threshold: self.threshold,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Writes finite values as numbers and the rest by their `Display` text.
mod non_finite_as_string {
    use serde::Serializer;

    pub(super) fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.collect_str(value)
        }
    }
}

/// One reported percentile of the ending value distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PercentileValue {
    /// Percentile in [0, 100].
    pub percentile: f64,
    /// Ending value at that percentile.
    #[serde(serialize_with = "non_finite_as_string::serialize")]
    pub value: f64,
}

/// "With `confidence`% probability the final amount exceeds `value`."
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DownsideLevel {
    /// Confidence in percent (100 − percentile).
    pub confidence: f64,
    /// Value exceeded with that confidence.
    #[serde(serialize_with = "non_finite_as_string::serialize")]
    pub value: f64,
}

/// Summary of the ending value distribution of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryReport {
    /// Number of scenarios summarised.
    pub n_scenarios: usize,
    /// Day-0 portfolio value.
    pub starting_capital: f64,
    /// Threshold used for `probability_below`.
    pub threshold: f64,
    /// Requested percentiles, in request order.
    pub percentiles: Vec<PercentileValue>,
    /// Arithmetic mean.
    #[serde(serialize_with = "non_finite_as_string::serialize")]
    pub mean: f64,
    /// 50th percentile.
    #[serde(serialize_with = "non_finite_as_string::serialize")]
    pub median: f64,
    /// Sample standard deviation (0 for a single scenario).
    #[serde(serialize_with = "non_finite_as_string::serialize")]
    pub std_dev: f64,
    /// Smallest ending value.
    #[serde(serialize_with = "non_finite_as_string::serialize")]
    pub min: f64,
    /// Largest ending value.
    #[serde(serialize_with = "non_finite_as_string::serialize")]
    pub max: f64,
    /// Fraction of scenarios ending strictly below `threshold`.
    pub probability_below: f64,
    /// Fraction of scenarios ending strictly above `starting_capital`.
    pub probability_of_profit: f64,
    /// Number of NaN or infinite ending values. When non-zero, the value
    /// fields above may serialise as `"inf"`, `"-inf"` or `"NaN"`.
    pub non_finite: usize,
}

impl SummaryReport {
    /// Value at percentile `p`, if it was requested.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|pv| pv.percentile == p)
            .map(|pv| pv.value)
    }

    /// Downside reading of every requested percentile below the median.
    pub fn downside_levels(&self) -> Vec<DownsideLevel> {
        self.percentiles
            .iter()
            .filter(|pv| pv.percentile < 50.0)
            .map(|pv| DownsideLevel {
                confidence: 100.0 - pv.percentile,
                value: pv.value,
            })
            .collect()
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Ending value over {} scenarios (starting capital {:.2})",
            self.n_scenarios, self.starting_capital
        )?;
        writeln!(f, "  {:<24}{:>16.2}", "mean", self.mean)?;
        writeln!(f, "  {:<24}{:>16.2}", "median", self.median)?;
        writeln!(f, "  {:<24}{:>16.2}", "std dev", self.std_dev)?;
        writeln!(f, "  {:<24}{:>16.2}", "min", self.min)?;
        writeln!(f, "  {:<24}{:>16.2}", "max", self.max)?;
        for pv in &self.percentiles {
            writeln!(f, "  {:<24}{:>16.2}", format!("p{}", pv.percentile), pv.value)?;
        }
        writeln!(
            f,
            "  {:<24}{:>15.2}%",
            format!("P(< {:.2})", self.threshold),
            self.probability_below * 100.0
        )?;
        writeln!(
            f,
            "  {:<24}{:>15.2}%",
            "P(profit)",
            self.probability_of_profit * 100.0
        )?;
        if self.non_finite > 0 {
            writeln!(f, "  {:<24}{:>16}", "non-finite", self.non_finite)?;
        }
        for level in self.downside_levels() {
            writeln!(
                f,
                "With {}% probability the final amount exceeds {:.2}",
                level.confidence, level.value
            )?;
        }
        Ok(())
    }
}

/// Summarises ending values.
///
/// # Examples
///
/// ```rust
/// use forecast_risk::{OutcomeSummarizer, SummaryConfig};
///
/// let config = SummaryConfig::builder().threshold(100.0).build().unwrap();
/// let report = OutcomeSummarizer::new(config)
///     .summarize_values(&[90.0, 95.0, 100.0, 105.0, 110.0], 100.0)
///     .unwrap();
///
/// assert_eq!(report.probability_below, 0.4);
/// assert_eq!(report.median, 100.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct OutcomeSummarizer {
    config: SummaryConfig,
}

impl OutcomeSummarizer {
    /// Creates a summarizer.
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summarises the ending values of a completed run.
    ///
    /// # Errors
    ///
    /// As [`summarize_values`](Self::summarize_values), with the run's
    /// starting capital.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use forecast_core::{CovarianceMatrix, MarketStatistics, MeanVector, Weights};
    /// use forecast_engine::{PathSimulator, SimulationConfig};
    /// use forecast_risk::{OutcomeSummarizer, SummaryConfig};
    ///
    /// let stats = MarketStatistics::from_parts(
    ///     MeanVector::new(vec![0.0003, 0.0002]),
    ///     CovarianceMatrix::new(vec![0.0001, 0.00002, 0.00002, 0.0002], 2).unwrap(),
    /// )
    /// .unwrap();
    /// let config = SimulationConfig::builder()
    ///     .n_scenarios(500)
    ///     .n_days(63)
    ///     .starting_capital(50_000.0)
    ///     .seed(7)
    ///     .build()
    ///     .unwrap();
    /// let result = PathSimulator::new(config)
    ///     .simulate(&stats, &Weights::equal(2).unwrap())
    ///     .unwrap()
    ///     .into_result()
    ///     .unwrap();
    ///
    /// let summarizer = OutcomeSummarizer::new(SummaryConfig::default());
    /// let report = summarizer.summarize(&result).unwrap();
    ///
    /// assert_eq!(report.n_scenarios, 500);
    /// assert_eq!(report.threshold, 50_000.0);
    /// assert!(report.percentile(1.0).unwrap() <= report.percentile(5.0).unwrap());
    /// ```
    pub fn summarize(&self, result: &SimulationResult) -> Result<SummaryReport, SummaryError> {
        self.summarize_values(result.ending_values(), result.starting_capital())
    }

    /// Summarises raw ending values against `starting_capital`.
    ///
    /// # Errors
    ///
    /// - `EmptySimulation` if `values` is empty
    /// - `InvalidPercentile` / `InvalidThreshold` from the configuration
    /// - `InvalidThreshold` if no threshold is configured and
    ///   `starting_capital` is not finite
    pub fn summarize_values(
        &self,
        values: &[f64],
        starting_capital: f64,
    ) -> Result<SummaryReport, SummaryError> {
        if values.is_empty() {
            return Err(SummaryError::EmptySimulation);
        }
        self.config.validate()?;
        let threshold = self.config.threshold.unwrap_or(starting_capital);
        if !threshold.is_finite() {
            return Err(SummaryError::InvalidThreshold(threshold));
        }

        let n = values.len();
        let sorted = sorted(values);

        let mean = values.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        let below = values.iter().filter(|&&v| v < threshold).count();
        let profitable = values.iter().filter(|&&v| v > starting_capital).count();
        let non_finite = values.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(non_finite, "summarising non-finite ending values");
        }

        let percentiles = self
            .config
            .percentiles
            .iter()
            .map(|&p| PercentileValue {
                percentile: p,
                value: interpolate(&sorted, p),
            })
            .collect();

        let report = SummaryReport {
            n_scenarios: n,
            starting_capital,
            threshold,
            percentiles,
            mean,
            median: interpolate(&sorted, 50.0),
            std_dev,
            min: sorted[0],
            max: sorted[n - 1],
            probability_below: below as f64 / n as f64,
            probability_of_profit: profitable as f64 / n as f64,
            non_finite,
        };

        debug!(
            scenarios = n,
            mean = report.mean,
            probability_below = report.probability_below,
            "summarised ending values"
        );
        Ok(report)
    }
}
