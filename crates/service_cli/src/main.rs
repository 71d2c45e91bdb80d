//! Forecast CLI - Portfolio Monte Carlo Forecasts from the Command Line
//!
//! # Commands
//!
//! - `forecast run --input <file>` - Simulate a portfolio and summarise ending values
//! - `forecast stats --input <file>` - Print the estimated mean vector and covariance
//!
//! # Configuration
//!
//! Defaults come from `forecast.toml` (or `--config <file>`), then
//! `FORECAST_*` environment variables, then command-line flags.
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate wires the core crates
//! (`forecast_core`, `forecast_engine`, `forecast_risk`) to files and the
//! terminal. None of them perform IO themselves.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod loader;
mod output;

pub use error::{CliError, Result};

/// Portfolio Monte Carlo forecaster
#[derive(Parser)]
#[command(name = "forecast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: ./forecast.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate portfolio value paths and summarise the outcome
    Run(commands::run::RunArgs),

    /// Print mean returns and covariance estimated from a return history
    Stats(commands::stats::StatsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::Settings::load(cli.config.as_deref())?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "debug"
        } else {
            settings.log_level.as_str()
        })
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match &cli.command {
        Commands::Run(args) => commands::run::run(args, &settings)?,
        Commands::Stats(args) => commands::stats::run(args, &settings)?,
    }
    Ok(())
}
