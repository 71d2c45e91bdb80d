//! Order statistics shared by the summary and the per-day bands.

use crate::error::SummaryError;

/// Checks that `p` lies in [0, 100].
#[inline]
pub(crate) fn validate_percentile(p: f64) -> Result<f64, SummaryError> {
    if (0.0..=100.0).contains(&p) {
        Ok(p)
    } else {
        Err(SummaryError::InvalidPercentile(p))
    }
}

/// Sorts a copy of `values` in IEEE total order.
///
/// Infinities sort at the ends; NaN sorts by sign bit, so nothing panics.
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    sorted
}

/// Percentile `p` of non-empty `sorted` values by linear interpolation
/// between order statistics at rank `p / 100 × (n − 1)`.
///
/// When either neighbour is non-finite the nearer one is returned as is,
/// so an infinite tail reads as infinite rather than NaN.
#[inline]
pub(crate) fn interpolate(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let (below, above) = (sorted[lo], sorted[hi]);
    if lo == hi || below == above {
        return below;
    }
    let frac = rank - lo as f64;
    if !below.is_finite() || !above.is_finite() {
        return if frac < 0.5 { below } else { above };
    }
    below + (above - below) * frac
}
