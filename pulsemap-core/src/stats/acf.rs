//! Autocorrelation function with drop-null semantics.

use super::moments::{confidence_bound, nan_mean, valid_count};
use super::{Correlogram, CorrelogramPoint};

/// Compute the ACF of a scalar series for lags `0..=max_lag`.
///
/// Lag 0 is 1.0 by convention. For lag k ≥ 1 the value is the normalized
/// autocovariance: pairs where either side is NaN are dropped from the
/// numerator, NaN entries are dropped from the mean and denominator. A
/// zero denominator (constant or empty series) yields 0.0 at every lag
/// beyond 0 rather than an error.
///
/// Lags beyond the available data are still reported (computed over
/// whatever pairs exist, which may be none) — lenient reporting over
/// strict validation.
pub fn acf(values: &[f64], max_lag: usize) -> Correlogram {
    let n = valid_count(values);
    let mean = nan_mean(values);

    let denominator: f64 = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - mean).powi(2))
        .sum();

    let mut points = Vec::with_capacity(max_lag + 1);
    points.push(CorrelogramPoint { lag: 0, value: 1.0 });

    for k in 1..=max_lag {
        let value = if denominator == 0.0 {
            0.0
        } else {
            let mut numerator = 0.0;
            for i in k..values.len() {
                let a = values[i];
                let b = values[i - k];
                if !a.is_nan() && !b.is_nan() {
                    numerator += (a - mean) * (b - mean);
                }
            }
            numerator / denominator
        };
        points.push(CorrelogramPoint {
            lag: k as i32,
            value,
        });
    }

    Correlogram {
        points,
        confidence: confidence_bound(n),
    }
}
