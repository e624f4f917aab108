//! NaN-aware moment helpers shared by the correlogram analyzers.

/// Count of non-NaN entries.
pub fn valid_count(values: &[f64]) -> usize {
    values.iter().filter(|v| !v.is_nan()).count()
}

/// Mean over non-NaN entries; NaN when there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        if !v.is_nan() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Population standard deviation over non-NaN entries; NaN when empty.
pub fn nan_population_std(values: &[f64]) -> f64 {
    let mean = nan_mean(values);
    if mean.is_nan() {
        return f64::NAN;
    }
    let mut sum_sq = 0.0;
    let mut n = 0usize;
    for v in values {
        if !v.is_nan() {
            sum_sq += (v - mean).powi(2);
            n += 1;
        }
    }
    (sum_sq / n as f64).sqrt()
}

/// Standardize to zero mean and unit population standard deviation,
/// computed over non-NaN entries (NaN entries stay NaN).
///
/// Returns `None` when the series is empty or has zero variance; callers
/// fall back to 0.0 correlations rather than dividing by zero.
pub fn standardize(values: &[f64]) -> Option<Vec<f64>> {
    let mean = nan_mean(values);
    let std = nan_population_std(values);
    if std.is_nan() || std == 0.0 {
        return None;
    }
    Some(values.iter().map(|v| (v - mean) / std).collect())
}

/// Pearson correlation over jointly non-NaN pairs.
///
/// Recenters within the overlap. Degenerate overlaps (fewer than two
/// pairs, zero variance on either side) yield 0.0, never NaN.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        cov += (a - mx) * (b - my);
        var_x += (a - mx).powi(2);
        var_y += (b - my).powi(2);
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cov / denom
    }
}

/// Large-sample approximate 95% white-noise band: `2/sqrt(n)`, 0.0 at n=0.
pub fn confidence_bound(n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        2.0 / (n as f64).sqrt()
    }
}
