//! Output rendering and export.

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use forecast_engine::SimulationResult;
use tracing::info;

use crate::Result;

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// JSON document.
    Json,
}

/// Writes the retained paths of `result` as CSV: one row per scenario,
/// columns `scenario,day_0,...,day_D`.
pub fn write_paths_csv<W: Write>(writer: W, result: &SimulationResult) -> Result<()> {
    let paths = result.paths();
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(paths.path_len() + 1);
    header.push("scenario".to_string());
    header.extend((0..paths.path_len()).map(|day| format!("day_{day}")));
    writer.write_record(&header)?;

    for (scenario, path) in paths.iter().enumerate() {
        let mut record = Vec::with_capacity(path.len() + 1);
        record.push(scenario.to_string());
        record.extend(path.iter().map(f64::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the retained paths of `result` to the file at `path`.
pub fn export_paths(path: &Path, result: &SimulationResult) -> Result<()> {
    write_paths_csv(std::fs::File::create(path)?, result)?;
    info!(
        path = %path.display(),
        paths = result.paths().n_paths(),
        "exported scenario paths"
    );
    Ok(())
}

/// Renders a labelled matrix as a fixed-width table.
pub fn format_matrix(labels: &[String], rows: &[Vec<f64>]) -> String {
    let width = labels.iter().map(String::len).max().unwrap_or(0).max(12);
    let mut out = format!("{:width$}", "");
    for label in labels {
        out.push_str(&format!(" {label:>width$}"));
    }
    out.push('\n');
    for (label, row) in labels.iter().zip(rows) {
        out.push_str(&format!("{label:width$}"));
        for value in row {
            out.push_str(&format!(" {value:>width$.6e}"));
        }
        out.push('\n');
    }
    out
}
