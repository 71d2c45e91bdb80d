//! Stats command implementation
//!
//! Prints the mean vector and covariance matrix estimated from a return
//! history, and whether the covariance can drive a simulation.

use std::path::PathBuf;

use clap::Args;
use forecast_core::{estimate, CovarianceDenominator, HistoricalReturns, MarketStatistics};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::loader::{self, InputKind};
use crate::output::{format_matrix, OutputFormat};
use crate::Result;

/// Arguments of `forecast stats`.
#[derive(Debug, Clone, Args)]
pub struct StatsArgs {
    /// CSV file of daily returns (or prices) with asset identifiers as header
    #[arg(short, long)]
    pub input: PathBuf,

    /// What the input cells hold
    #[arg(long, value_enum, default_value_t = InputKind::Returns)]
    pub input_kind: InputKind,

    /// Estimate covariance with denominator T instead of T - 1
    #[arg(long)]
    pub population: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Statistics printed by `forecast stats --format json`.
#[derive(Debug, Serialize)]
pub struct StatsOutput<'a> {
    /// Asset identifiers.
    pub assets: &'a [String],
    /// Estimated statistics.
    pub statistics: &'a MarketStatistics,
    /// Historical standard deviation per asset.
    pub volatilities: Vec<f64>,
    /// Whether the covariance has a Cholesky factor.
    pub decomposable: bool,
}

/// Run the stats command
pub fn run(args: &StatsArgs, settings: &Settings) -> Result<()> {
    let returns = loader::load_returns(&args.input, args.input_kind)?;
    let denominator = if args.population {
        CovarianceDenominator::Population
    } else {
        settings.denominator
    };
    println!("{}", render(&returns, denominator, args.format)?);
    Ok(())
}

fn render(
    returns: &HistoricalReturns,
    denominator: CovarianceDenominator,
    format: OutputFormat,
) -> Result<String> {
    let statistics = estimate(returns, denominator)?;
    let decomposable = match statistics.covariance.cholesky() {
        Ok(_) => true,
        Err(err) => {
            warn!(%err, "covariance cannot be used for simulation");
            false
        }
    };
    info!(
        observations = statistics.n_observations,
        ?denominator,
        "estimated market statistics"
    );

    let output = StatsOutput {
        assets: returns.assets(),
        statistics: &statistics,
        volatilities: statistics.volatilities(),
        decomposable,
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&output)?),
        OutputFormat::Table => {
            let assets = output.assets;
            let mut text = format!(
                "{} observations, {:?} covariance\n\nMean daily return\n",
                statistics.n_observations, denominator
            );
            for (asset, (mean, vol)) in assets
                .iter()
                .zip(statistics.mean.as_slice().iter().zip(&output.volatilities))
            {
                text.push_str(&format!("  {asset:<24}{mean:>14.6e}  (std {vol:.6e})\n"));
            }
            text.push_str("\nCovariance\n");
            text.push_str(&format_matrix(assets, &statistics.covariance.to_rows()));
            if !decomposable {
                text.push_str(
                    "\nWarning: covariance is not positive definite \
                     (duplicate or constant series?)\n",
                );
            }
            Ok(text)
        }
    }
}
