//! Forecast settings.
//!
//! Handles loading settings from a TOML file and environment variables.
//!
//! Priority (highest to lowest):
//! 1. Command-line flags (applied by each command)
//! 2. Environment variables (`FORECAST_*`)
//! 3. `forecast.toml`
//! 4. Default values

use std::path::Path;
use std::str::FromStr;

use forecast_core::CovarianceDenominator;
use forecast_risk::DEFAULT_PERCENTILES;
use serde::Deserialize;
use tracing::debug;

use crate::{CliError, Result};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "forecast.toml";

/// Defaults shared by every command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Number of simulated scenarios.
    pub scenarios: usize,
    /// Number of simulated trading days.
    pub days: usize,
    /// Starting capital.
    pub capital: f64,
    /// Base seed; random when unset.
    pub seed: Option<u64>,
    /// Reported percentiles of ending value.
    pub percentiles: Vec<f64>,
    /// Loss threshold; starting capital when unset.
    pub threshold: Option<f64>,
    /// Covariance denominator.
    pub denominator: CovarianceDenominator,
    /// Default tracing filter.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scenarios: 1_000,
            days: 252,
            capital: 100_000.0,
            seed: None,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            threshold: None,
            denominator: CovarianceDenominator::Sample,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the file at `path`, or the default file when `path` is `None`,
    /// then applies environment overrides.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) if !path.exists() => {
                return Err(CliError::FileNotFound(path.display().to_string()))
            }
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Overrides fields from `FORECAST_*` variables returned by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("FORECAST_SCENARIOS") {
            self.scenarios = parse_var("FORECAST_SCENARIOS", &value)?;
        }
        if let Some(value) = lookup("FORECAST_DAYS") {
            self.days = parse_var("FORECAST_DAYS", &value)?;
        }
        if let Some(value) = lookup("FORECAST_CAPITAL") {
            self.capital = parse_var("FORECAST_CAPITAL", &value)?;
        }
        if let Some(value) = lookup("FORECAST_SEED") {
            self.seed = Some(parse_var("FORECAST_SEED", &value)?);
        }
        if let Some(value) = lookup("FORECAST_LOG_LEVEL") {
            self.log_level = value;
        }
        debug!(settings = ?self, "settings resolved");
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::invalid_setting(key, value, format!("expected {}", std::any::type_name::<T>()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.scenarios, 1_000);
        assert_eq!(settings.days, 252);
        assert_eq!(settings.capital, 100_000.0);
        assert_eq!(settings.percentiles, vec![1.0, 5.0, 50.0]);
        assert_eq!(settings.denominator, CovarianceDenominator::Sample);
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let settings: Settings = toml::from_str(
            r#"
            scenarios = 5000
            seed = 7
            denominator = "population"
            "#,
        )
        .unwrap();

        assert_eq!(settings.scenarios, 5_000);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.denominator, CovarianceDenominator::Population);
        assert_eq!(settings.days, 252);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<Settings>("simulations = 10").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                ("FORECAST_SCENARIOS", "250"),
                ("FORECAST_CAPITAL", "5000.5"),
                ("FORECAST_SEED", " 42 "),
                ("FORECAST_LOG_LEVEL", "debug"),
            ]))
            .unwrap();

        assert_eq!(settings.scenarios, 250);
        assert_eq!(settings.days, 252);
        assert_eq!(settings.capital, 5000.5);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_env_invalid_value() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(env(&[("FORECAST_DAYS", "many")]))
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidSetting { ref key, .. } if key == "FORECAST_DAYS"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "days = 21\ncapital = 2500.0\npercentiles = [10.0, 90.0]").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.days, 21);
        assert_eq!(settings.capital, 2_500.0);
        assert_eq!(settings.percentiles, vec![10.0, 90.0]);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/forecast.toml"))).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }
}
