//! CSV input loading.
//!
//! The header row names the assets; each following row is one day. A
//! leading `date` column is skipped so exported price tables load as-is.

use std::io::Read;
use std::path::Path;

use clap::ValueEnum;
use forecast_core::HistoricalReturns;
use tracing::info;

use crate::{CliError, Result};

/// What the numeric cells of an input file hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputKind {
    /// Simple daily returns.
    #[default]
    Returns,
    /// Daily prices, converted to simple returns.
    Prices,
}

/// Loads historical returns from the CSV file at `path`.
pub fn load_returns(path: &Path, kind: InputKind) -> Result<HistoricalReturns> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let returns = read_returns(std::fs::File::open(path)?, kind)?;
    info!(
        path = %path.display(),
        days = returns.n_days(),
        assets = returns.n_assets(),
        "loaded historical returns"
    );
    Ok(returns)
}

/// Reads historical returns from CSV data.
pub fn read_returns<R: Read>(reader: R, kind: InputKind) -> Result<HistoricalReturns> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let skip = usize::from(
        headers
            .get(0)
            .is_some_and(|first| first.eq_ignore_ascii_case("date")),
    );
    let assets: Vec<String> = headers.iter().skip(skip).map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row = record
            .iter()
            .skip(skip)
            .zip(&assets)
            .map(|(cell, asset)| {
                cell.parse::<f64>().map_err(|_| CliError::InvalidNumber {
                    line,
                    column: asset.clone(),
                    value: cell.to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let returns = match kind {
        InputKind::Returns => HistoricalReturns::new(rows)?,
        InputKind::Prices => HistoricalReturns::from_prices(&rows)?,
    };
    Ok(returns.with_assets(assets)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use forecast_core::DataError;

    #[test]
    fn test_read_returns() {
        let csv = "AAPL,MSFT\n0.01,-0.02\n0.005,0.003\n-0.01,0.0\n";
        let returns = read_returns(csv.as_bytes(), InputKind::Returns).unwrap();

        assert_eq!(returns.n_days(), 3);
        assert_eq!(returns.assets(), &["AAPL".to_string(), "MSFT".to_string()]);
        assert_eq!(returns.get(0, 1), -0.02);
    }

    #[test]
    fn test_read_prices_with_date_column() {
        let csv = "Date,SPY\n2024-01-02,100\n2024-01-03,110\n2024-01-04,99\n";
        let returns = read_returns(csv.as_bytes(), InputKind::Prices).unwrap();

        assert_eq!(returns.n_days(), 2);
        assert_eq!(returns.assets(), &["SPY".to_string()]);
        assert_relative_eq!(returns.get(0, 0), 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.get(1, 0), -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_number_reports_position() {
        let csv = "A,B\n0.01,0.02\n0.01,abc\n";
        let err = read_returns(csv.as_bytes(), InputKind::Returns).unwrap_err();
        match err {
            CliError::InvalidNumber {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "B");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_observation_rejected() {
        let csv = "A\n0.01\n";
        let err = read_returns(csv.as_bytes(), InputKind::Returns).unwrap_err();
        assert!(matches!(
            err,
            CliError::Data(DataError::InsufficientData { observations: 1 })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_returns(Path::new("/nonexistent/returns.csv"), InputKind::Returns)
            .unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }
}
