//! Lagged cross-correlation between two date-aligned series.
//!
//! Lag sign convention (drives causal reading downstream):
//! - lag < 0 — y is delayed by |lag| relative to x: x leads y.
//! - lag ≥ 0 — x is delayed by lag relative to y: y leads x.

use super::moments::{confidence_bound, pearson, standardize};
use super::{Correlogram, CorrelogramPoint};

/// Compute the CCF of two equal-length, date-aligned series for lags
/// `-max_lag..=max_lag`.
///
/// Both series are standardized (zero mean, unit population std) first,
/// making values Pearson-like regardless of native scale. Each lag
/// correlates only the overlapping region left after shifting, dropping
/// jointly-NaN pairs. A zero-variance input makes every lag 0.0.
///
/// The confidence bound is `2/sqrt(n)` with `n` the jointly non-NaN pair
/// count of the *unshifted* series, reused at every lag even though
/// shifted overlaps are smaller. Inherited from the reference behavior;
/// it slightly overstates significance at large lags.
pub fn ccf(x: &[f64], y: &[f64], max_lag: usize) -> Correlogram {
    assert_eq!(x.len(), y.len(), "CCF inputs must be date-aligned");

    let n_joint = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .count();
    let confidence = confidence_bound(n_joint);

    let lags: Vec<i32> = (-(max_lag as i32)..=max_lag as i32).collect();

    let (zx, zy) = match (standardize(x), standardize(y)) {
        (Some(zx), Some(zy)) => (zx, zy),
        // Zero variance on either side: correlation undefined, report 0.0.
        _ => {
            let points = lags
                .into_iter()
                .map(|lag| CorrelogramPoint { lag, value: 0.0 })
                .collect();
            return Correlogram { points, confidence };
        }
    };

    let n = zx.len();
    let points = lags
        .into_iter()
        .map(|lag| {
            let k = lag.unsigned_abs() as usize;
            let value = if k >= n {
                0.0
            } else if lag < 0 {
                // corr(x[k..], y[..n-k]): pairs (x[i], y[i-k])
                pearson(&zx[k..], &zy[..n - k])
            } else {
                // corr(x[..n-k], y[k..]): pairs (x[i-k], y[i])
                pearson(&zx[..n - k], &zy[k..])
            };
            CorrelogramPoint { lag, value }
        })
        .collect();

    Correlogram { points, confidence }
}
