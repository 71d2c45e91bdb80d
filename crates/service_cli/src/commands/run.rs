//! Run command implementation
//!
//! Loads a return history, simulates the portfolio, and reports the
//! distribution of ending values.

use std::path::PathBuf;

use clap::Args;
use forecast_core::{estimate, WeightPolicy, Weights};
use forecast_engine::{PathRetention, PathSimulator, SimulationConfig, SimulationRun};
use forecast_risk::{OutcomeSummarizer, SummaryConfig, SummaryReport};
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::loader::{self, InputKind};
use crate::output::{self, OutputFormat};
use crate::{CliError, Result};

/// Arguments of `forecast run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// CSV file of daily returns (or prices) with asset identifiers as header
    #[arg(short, long)]
    pub input: PathBuf,

    /// What the input cells hold
    #[arg(long, value_enum, default_value_t = InputKind::Returns)]
    pub input_kind: InputKind,

    /// Comma-separated portfolio weights; equal weights when omitted
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    pub weights: Vec<f64>,

    /// Accept short positions and weights not summing to one
    #[arg(long)]
    pub leveraged: bool,

    /// Number of simulated trading days
    #[arg(short, long)]
    pub days: Option<usize>,

    /// Number of scenarios
    #[arg(short, long)]
    pub scenarios: Option<usize>,

    /// Starting capital
    #[arg(long)]
    pub capital: Option<f64>,

    /// Base seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Comma-separated percentiles of ending value to report
    #[arg(short, long, value_delimiter = ',')]
    pub percentiles: Vec<f64>,

    /// Loss threshold; defaults to the starting capital
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Estimate covariance with denominator T instead of T - 1
    #[arg(long)]
    pub population: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write retained scenario paths to this CSV file
    #[arg(long)]
    pub paths_out: Option<PathBuf>,

    /// Retain only the first N scenario paths for export
    #[arg(long, requires = "paths_out")]
    pub sample_paths: Option<usize>,
}

/// Report printed by `forecast run --format json`.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    /// Asset identifiers.
    pub assets: &'a [String],
    /// Portfolio weights.
    pub weights: &'a [f64],
    /// Simulated days.
    pub days: usize,
    /// Base seed that reproduces the run.
    pub base_seed: u64,
    /// Daily standard deviation of historical portfolio returns, `√(wᵀ Σ w)`.
    pub historical_volatility: f64,
    /// Ending value summary.
    pub summary: &'a SummaryReport,
}

/// Run the run command
pub fn run(args: &RunArgs, settings: &Settings) -> Result<()> {
    let returns = loader::load_returns(&args.input, args.input_kind)?;
    let weights = build_weights(&args.weights, args.leveraged, returns.n_assets())?;

    let summary_config = SummaryConfig::builder()
        .percentiles(if args.percentiles.is_empty() {
            settings.percentiles.clone()
        } else {
            args.percentiles.clone()
        })
        .maybe_threshold(args.threshold.or(settings.threshold))
        .build()?;
    let config = simulation_config(args, settings)?;

    info!(
        assets = returns.n_assets(),
        scenarios = config.n_scenarios(),
        days = config.n_days(),
        "Starting forecast..."
    );

    let statistics = estimate(&returns, config.denominator())?;
    let historical_volatility = statistics
        .covariance
        .quadratic_form(weights.as_slice())
        .sqrt();

    let result = match PathSimulator::new(config).simulate(&statistics, &weights)? {
        SimulationRun::Complete(result) => result,
        SimulationRun::Cancelled {
            completed,
            requested,
        } => {
            return Err(CliError::Cancelled {
                completed,
                requested,
            })
        }
    };
    let report = OutcomeSummarizer::new(summary_config).summarize(&result)?;

    if let Some(path) = &args.paths_out {
        output::export_paths(path, &result)?;
    }

    let output = RunOutput {
        assets: returns.assets(),
        weights: weights.as_slice(),
        days: result.n_days(),
        base_seed: result.base_seed(),
        historical_volatility,
        summary: &report,
    };
    println!("{}", render(&output, args.format)?);

    info!("Forecast complete");
    Ok(())
}

/// Builds the simulation configuration; flags override settings.
pub fn simulation_config(args: &RunArgs, settings: &Settings) -> Result<SimulationConfig> {
    if args.sample_paths == Some(0) {
        return Err(CliError::invalid_argument(
            "--sample-paths must be at least 1; omit --paths-out to skip the export",
        ));
    }
    let retention = match (&args.paths_out, args.sample_paths) {
        (None, _) => PathRetention::EndingOnly,
        (Some(_), Some(n)) => PathRetention::Sample(n),
        (Some(_), None) => PathRetention::All,
    };
    let denominator = if args.population {
        forecast_core::CovarianceDenominator::Population
    } else {
        settings.denominator
    };

    Ok(SimulationConfig::builder()
        .n_scenarios(args.scenarios.unwrap_or(settings.scenarios))
        .n_days(args.days.unwrap_or(settings.days))
        .starting_capital(args.capital.unwrap_or(settings.capital))
        .maybe_seed(args.seed.or(settings.seed))
        .denominator(denominator)
        .path_retention(retention)
        .build()?)
}

/// Equal weights when none are given, otherwise the given weights under
/// the requested policy.
pub fn build_weights(values: &[f64], leveraged: bool, n_assets: usize) -> Result<Weights> {
    let weights = if values.is_empty() {
        Weights::equal(n_assets)?
    } else {
        let policy = if leveraged {
            WeightPolicy::Leveraged
        } else {
            WeightPolicy::FullyInvested
        };
        Weights::new(values.to_vec(), policy)?
    };
    weights.ensure_len(n_assets)?;
    Ok(weights)
}

fn render(output: &RunOutput<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
        OutputFormat::Table => {
            let mut text = String::from("Portfolio\n");
            for (asset, weight) in output.assets.iter().zip(output.weights) {
                text.push_str(&format!("  {asset:<24}{:>15.2}%\n", weight * 100.0));
            }
            text.push_str(&format!(
                "Historical daily volatility {:.4}%\n",
                output.historical_volatility * 100.0
            ));
            text.push_str(&format!(
                "Horizon {} days, base seed {}\n\n",
                output.days, output.base_seed
            ));
            text.push_str(&output.summary.to_string());
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use forecast_core::DataError;
    use std::io::Write;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> RunArgs {
        let mut full = vec!["forecast"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    fn returns_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "AAA,BBB\n0.010,-0.004\n-0.003,0.006\n0.007,0.001\n0.002,-0.002\n-0.005,0.004"
        )
        .unwrap();
        file
    }

    #[test]
    fn test_flags_override_settings() {
        let args = parse(&["-i", "r.csv", "--scenarios", "50", "--seed", "9"]);
        let settings = Settings {
            days: 21,
            seed: Some(1),
            ..Settings::default()
        };

        let config = simulation_config(&args, &settings).unwrap();
        assert_eq!(config.n_scenarios(), 50);
        assert_eq!(config.n_days(), 21);
        assert_eq!(config.seed(), Some(9));
        assert_eq!(config.path_retention(), PathRetention::EndingOnly);
    }

    #[test]
    fn test_paths_out_retention() {
        let args = parse(&["-i", "r.csv", "--paths-out", "p.csv", "--sample-paths", "10"]);
        let config = simulation_config(&args, &Settings::default()).unwrap();
        assert_eq!(config.path_retention(), PathRetention::Sample(10));

        let args = parse(&["-i", "r.csv", "--paths-out", "p.csv"]);
        let config = simulation_config(&args, &Settings::default()).unwrap();
        assert_eq!(config.path_retention(), PathRetention::All);
    }

    #[test]
    fn test_weights_parsing() {
        let args = parse(&["-i", "r.csv", "-w", "0.6,0.4"]);
        assert_eq!(args.weights, vec![0.6, 0.4]);

        let args = parse(&["-i", "r.csv", "-w", "1.5,-0.5", "--leveraged"]);
        let weights = build_weights(&args.weights, args.leveraged, 2).unwrap();
        assert_eq!(weights.policy(), WeightPolicy::Leveraged);
    }

    #[test]
    fn test_weights_default_to_equal() {
        let weights = build_weights(&[], false, 4).unwrap();
        assert_eq!(weights.as_slice(), &[0.25; 4]);
    }

    #[test]
    fn test_weights_length_mismatch() {
        let err = build_weights(&[0.5, 0.5], false, 3).unwrap_err();
        assert!(matches!(err, CliError::Data(DataError::InvalidWeights(_))));
    }

    #[test]
    fn test_zero_sample_paths_rejected() {
        let args = parse(&["-i", "r.csv", "--paths-out", "p.csv", "--sample-paths", "0"]);
        let err = simulation_config(&args, &Settings::default()).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
        assert!(err.to_string().starts_with("Invalid argument: --sample-paths"));
    }

    #[test]
    fn test_zero_scenarios_rejected() {
        let args = parse(&["-i", "r.csv", "--scenarios", "0"]);
        let err = simulation_config(&args, &Settings::default()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_run_end_to_end() {
        let input = returns_file();
        let dir = tempfile::tempdir().unwrap();
        let paths_out = dir.path().join("paths.csv");
        let args = parse(&[
            "-i",
            input.path().to_str().unwrap(),
            "--scenarios",
            "20",
            "--days",
            "5",
            "--seed",
            "3",
            "--paths-out",
            paths_out.to_str().unwrap(),
            "--format",
            "json",
        ]);

        run(&args, &Settings::default()).unwrap();

        let exported = std::fs::read_to_string(&paths_out).unwrap();
        assert_eq!(exported.lines().count(), 21);
    }

    #[test]
    fn test_render_json() {
        let returns = loader::read_returns(
            "A,B\n0.01,0.02\n0.00,-0.01\n0.02,0.00\n".as_bytes(),
            InputKind::Returns,
        )
        .unwrap();
        let report = OutcomeSummarizer::default()
            .summarize_values(&[90.0, 110.0], 100.0)
            .unwrap();
        let output = RunOutput {
            assets: returns.assets(),
            weights: &[0.5, 0.5],
            days: 10,
            base_seed: 5,
            historical_volatility: 0.0125,
            summary: &report,
        };

        let json = render(&output, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["base_seed"], 5);
        assert_eq!(value["historical_volatility"], 0.0125);
        assert_eq!(value["summary"]["probability_below"], 0.5);

        let table = render(&output, OutputFormat::Table).unwrap();
        assert!(table.contains("base seed 5"));
        assert!(table.contains("Historical daily volatility 1.2500%"));
    }
}
