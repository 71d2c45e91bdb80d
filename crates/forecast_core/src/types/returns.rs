//! Historical daily return matrix.
//!
//! [`HistoricalReturns`] holds T days × N assets of simple daily returns in
//! row-major order: `data[day * n_assets + asset]`.

use super::error::DataError;

/// Minimum number of observations needed to estimate a variance.
pub const MIN_OBSERVATIONS: usize = 2;

/// Validated historical return matrix (T days × N assets).
///
/// # Invariants
///
/// - N ≥ 1 and T ≥ 2
/// - every row has exactly N columns
/// - all values are finite
///
/// # Examples
///
/// ```rust
/// use forecast_core::types::HistoricalReturns;
///
/// let returns = HistoricalReturns::new(vec![
///     vec![0.01, -0.02],
///     vec![0.00, 0.01],
///     vec![-0.01, 0.03],
/// ])
/// .unwrap();
///
/// assert_eq!(returns.n_days(), 3);
/// assert_eq!(returns.n_assets(), 2);
/// assert_eq!(returns.get(2, 1), 0.03);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HistoricalReturns {
    /// Returns in row-major order (n_days × n_assets).
    data: Vec<f64>,
    /// Number of observations (T).
    n_days: usize,
    /// Number of assets (N).
    n_assets: usize,
    /// Asset identifiers, one per column.
    assets: Vec<String>,
}

impl HistoricalReturns {
    /// Builds a return matrix from one row per day.
    ///
    /// Asset identifiers default to `asset_0`, `asset_1`, ...
    ///
    /// # Errors
    ///
    /// - `NoAssets` if the first row is empty
    /// - `RaggedRow` if any row length differs from the first
    /// - `NonFiniteValue` for NaN or infinite entries
    /// - `InsufficientData` if fewer than two rows are supplied
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, DataError> {
        let n_assets = rows.first().map_or(0, Vec::len);
        if rows.is_empty() {
            return Err(DataError::InsufficientData { observations: 0 });
        }
        if n_assets == 0 {
            return Err(DataError::NoAssets);
        }

        let mut data = Vec::with_capacity(rows.len() * n_assets);
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != n_assets {
                return Err(DataError::RaggedRow {
                    row: row_idx,
                    expected: n_assets,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Self::from_flat(data, n_assets)
    }

    /// Builds a return matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new); a buffer whose length is not a multiple
    /// of `n_assets` is reported as a ragged final row.
    pub fn from_flat(data: Vec<f64>, n_assets: usize) -> Result<Self, DataError> {
        if n_assets == 0 {
            return Err(DataError::NoAssets);
        }
        if data.len() % n_assets != 0 {
            return Err(DataError::RaggedRow {
                row: data.len() / n_assets,
                expected: n_assets,
                got: data.len() % n_assets,
            });
        }

        let n_days = data.len() / n_assets;
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(DataError::NonFiniteValue {
                row: pos / n_assets,
                column: pos % n_assets,
            });
        }
        if n_days < MIN_OBSERVATIONS {
            return Err(DataError::InsufficientData {
                observations: n_days,
            });
        }

        Ok(Self {
            data,
            n_days,
            n_assets,
            assets: (0..n_assets).map(|i| format!("asset_{}", i)).collect(),
        })
    }

    /// Derives simple daily returns from a price matrix (one row per day).
    ///
    /// Each return is `p[t] / p[t-1] - 1`; the first row only seeds the
    /// computation, so T+1 price rows yield T return rows.
    ///
    /// # Errors
    ///
    /// - `NonPositivePrice` for zero or negative prices
    /// - `NonFiniteValue` for NaN or infinite prices
    /// - any error from [`new`](Self::new) on the derived returns
    ///
    /// # Examples
    ///
    /// ```rust
    /// use forecast_core::types::HistoricalReturns;
    ///
    /// let returns = HistoricalReturns::from_prices(&[
    ///     vec![100.0],
    ///     vec![110.0],
    ///     vec![99.0],
    /// ])
    /// .unwrap();
    ///
    /// assert!((returns.get(0, 0) - 0.10).abs() < 1e-12);
    /// assert!((returns.get(1, 0) + 0.10).abs() < 1e-12);
    /// ```
    pub fn from_prices(prices: &[Vec<f64>]) -> Result<Self, DataError> {
        let n_assets = prices.first().map_or(0, Vec::len);
        if n_assets == 0 && !prices.is_empty() {
            return Err(DataError::NoAssets);
        }

        for (row_idx, row) in prices.iter().enumerate() {
            if row.len() != n_assets {
                return Err(DataError::RaggedRow {
                    row: row_idx,
                    expected: n_assets,
                    got: row.len(),
                });
            }
            for (column, &price) in row.iter().enumerate() {
                if !price.is_finite() {
                    return Err(DataError::NonFiniteValue {
                        row: row_idx,
                        column,
                    });
                }
                if price <= 0.0 {
                    return Err(DataError::NonPositivePrice {
                        row: row_idx,
                        column,
                    });
                }
            }
        }

        let rows = prices
            .windows(2)
            .map(|pair| {
                pair[1]
                    .iter()
                    .zip(&pair[0])
                    .map(|(today, yesterday)| today / yesterday - 1.0)
                    .collect()
            })
            .collect();

        Self::new(rows)
    }

    /// Replaces the asset identifiers.
    ///
    /// # Errors
    ///
    /// Returns `AssetCountMismatch` if the number of identifiers differs
    /// from the number of columns.
    pub fn with_assets<S: Into<String>>(
        mut self,
        assets: impl IntoIterator<Item = S>,
    ) -> Result<Self, DataError> {
        let assets: Vec<String> = assets.into_iter().map(Into::into).collect();
        if assets.len() != self.n_assets {
            return Err(DataError::AssetCountMismatch {
                identifiers: assets.len(),
                columns: self.n_assets,
            });
        }
        self.assets = assets;
        Ok(self)
    }

    /// Returns the number of observations (T).
    #[inline]
    pub fn n_days(&self) -> usize {
        self.n_days
    }

    /// Returns the number of assets (N).
    #[inline]
    pub fn n_assets(&self) -> usize {
        self.n_assets
    }

    /// Returns the asset identifiers.
    #[inline]
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Returns the return of `asset` on `day`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, day: usize, asset: usize) -> f64 {
        assert!(asset < self.n_assets, "asset index {} out of bounds", asset);
        self.data[day * self.n_assets + asset]
    }

    /// Returns all asset returns observed on `day`.
    #[inline]
    pub fn row(&self, day: usize) -> &[f64] {
        let start = day * self.n_assets;
        &self.data[start..start + self.n_assets]
    }

    /// Iterates over the daily rows in chronological order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_assets)
    }

    /// Iterates over the return history of a single asset.
    pub fn column(&self, asset: usize) -> impl Iterator<Item = f64> + '_ {
        self.data[asset..].iter().step_by(self.n_assets).copied()
    }

    /// Returns the underlying row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
