//! Integration tests: returns → statistics → Cholesky factor.
//!
//! Verify that public types are reachable via absolute paths and that the
//! estimation pipeline behaves on realistic and degenerate histories.

use approx::assert_relative_eq;
use forecast_core::math::{CholeskyFactor, DecompositionError, PIVOT_TOLERANCE};
use forecast_core::statistics::{estimate, CovarianceDenominator};
use forecast_core::types::{DataError, HistoricalReturns, WeightPolicy, Weights};

/// Prices of three assets over eight days.
fn price_history() -> Vec<Vec<f64>> {
    vec![
        vec![100.0, 50.0, 20.0],
        vec![101.0, 49.5, 20.4],
        vec![100.5, 50.2, 20.1],
        vec![102.0, 50.0, 20.8],
        vec![101.2, 51.0, 20.5],
        vec![103.0, 50.7, 21.0],
        vec![102.4, 51.3, 20.7],
        vec![104.1, 51.0, 21.3],
    ]
}

#[test]
fn test_prices_to_factor() {
    let returns = HistoricalReturns::from_prices(&price_history())
        .unwrap()
        .with_assets(["SPY", "TLT", "GLD"])
        .unwrap();
    assert_eq!(returns.n_days(), 7);
    assert_eq!(returns.assets()[2], "GLD");

    let stats = estimate(&returns, CovarianceDenominator::Sample).unwrap();
    assert_eq!(stats.n_observations, 7);
    assert_eq!(stats.denominator, CovarianceDenominator::Sample);

    let factor = stats.covariance.cholesky().unwrap();
    let reconstructed = factor.reconstruct();
    for (a, b) in reconstructed.iter().zip(stats.covariance.as_slice()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-15, max_relative = 1e-10);
    }
}

#[test]
fn test_denominator_scales_covariance() {
    let returns = HistoricalReturns::from_prices(&price_history()).unwrap();
    let sample = estimate(&returns, CovarianceDenominator::Sample).unwrap();
    let population = estimate(&returns, CovarianceDenominator::Population).unwrap();

    let ratio = 7.0 / 6.0;
    for (s, p) in sample
        .covariance
        .as_slice()
        .iter()
        .zip(population.covariance.as_slice())
    {
        assert_relative_eq!(*s, *p * ratio, max_relative = 1e-12);
    }
    assert_eq!(sample.mean, population.mean);
}

#[test]
fn test_tracking_assets_rejected() {
    // Two funds tracking the same index: identical daily returns.
    let rows: Vec<Vec<f64>> = [0.004, -0.011, 0.007, 0.002, -0.003]
        .iter()
        .map(|r| vec![*r, *r, 0.5 * r + 0.001])
        .collect();
    let returns = HistoricalReturns::new(rows).unwrap();
    let stats = estimate(&returns, CovarianceDenominator::Sample).unwrap();

    match CholeskyFactor::decompose(&stats.covariance) {
        Err(DecompositionError::NonPositiveSemidefinite { index, pivot }) => {
            assert_eq!(index, 1);
            assert!(pivot <= PIVOT_TOLERANCE * stats.covariance.variance(0));
        }
        other => panic!("expected NonPositiveSemidefinite, got {other:?}"),
    }
}

#[test]
fn test_weights_against_history() {
    let returns = HistoricalReturns::from_prices(&price_history()).unwrap();
    let weights = Weights::new(vec![0.5, 0.3, 0.2], WeightPolicy::FullyInvested).unwrap();
    assert!(weights.ensure_len(returns.n_assets()).is_ok());

    let short = Weights::new(vec![0.5, 0.5], WeightPolicy::FullyInvested).unwrap();
    assert!(matches!(
        short.ensure_len(returns.n_assets()),
        Err(DataError::InvalidWeights(_))
    ));
}

#[test]
fn test_single_day_history_rejected() {
    let err = HistoricalReturns::from_prices(&price_history()[..2]).unwrap_err();
    assert_eq!(err, DataError::InsufficientData { observations: 1 });
}
