//! Price preprocessing: simple returns and rolling volatility.
//!
//! Returns are computed by observation order (sorted dates), not calendar
//! adjacency, so gaps in the date axis simply span the gap. Volatility is
//! the rolling population standard deviation of returns (divide by the
//! window size, not window − 1).

use chrono::NaiveDate;

/// A named `volatility_<w>d` column.
#[derive(Debug, Clone)]
pub struct VolatilityColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Raw price table, possibly already carrying derived columns.
///
/// Invariant: `dates` sorted ascending; all column vectors have the same
/// length as `dates`.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    /// Pre-existing returns column, preserved verbatim when present.
    pub returns: Option<Vec<f64>>,
    /// Pre-existing volatility columns, preserved verbatim when non-empty.
    pub volatility: Vec<VolatilityColumn>,
}

/// Price table with `returns` and at least one volatility column guaranteed.
#[derive(Debug, Clone)]
pub struct ProcessedPrices {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub returns: Vec<f64>,
    pub volatility: Vec<VolatilityColumn>,
}

/// Derive `returns` and `volatility_<window>d` where absent.
///
/// Pre-existing columns short-circuit computation: if the input already has
/// a returns column it is kept as-is, and if it has any `volatility_*`
/// column no new one is added.
pub fn augment(table: PriceTable, vol_window: usize) -> ProcessedPrices {
    assert!(vol_window >= 1, "volatility window must be >= 1");
    debug_assert_eq!(table.dates.len(), table.close.len());

    let returns = match table.returns {
        Some(existing) => existing,
        None => simple_returns(&table.close),
    };

    let mut volatility = table.volatility;
    if volatility.is_empty() {
        volatility.push(VolatilityColumn {
            name: format!("volatility_{vol_window}d"),
            values: rolling_population_std(&returns, vol_window),
        });
    }

    ProcessedPrices {
        dates: table.dates,
        close: table.close,
        returns,
        volatility,
    }
}

/// `r[t] = p[t]/p[t-1] - 1`; the first observation has no return (NaN).
pub fn simple_returns(close: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    for t in 1..close.len() {
        let prev = close[t - 1];
        if prev != 0.0 {
            out[t] = close[t] / prev - 1.0;
        }
    }
    out
}

/// Rolling population standard deviation over a trailing window.
///
/// NaN until the window is full; a NaN anywhere inside the window poisons
/// that position (no partial windows, no imputation).
pub fn rolling_population_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }
    for t in (window - 1)..n {
        let slice = &values[t + 1 - window..=t];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
        out[t] = var.sqrt();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_util::{assert_approx, dates_from};

    #[test]
    fn returns_from_consecutive_prices() {
        let r = simple_returns(&[100.0, 110.0, 121.0]);
        assert!(r[0].is_nan());
        assert_approx(r[1], 0.10);
        assert_approx(r[2], 0.10);
    }

    #[test]
    fn rolling_std_window_two_is_symmetric() {
        let returns = [f64::NAN, 0.10, -0.10, 0.10];
        let vol = rolling_population_std(&returns, 2);
        assert!(vol[0].is_nan());
        assert!(vol[1].is_nan()); // window touches the NaN first return
        // population std of [0.10, -0.10] = 0.10; same for [-0.10, 0.10]
        assert_approx(vol[2], 0.10);
        assert_approx(vol[3], 0.10);
    }

    #[test]
    fn augment_computes_missing_columns() {
        let table = PriceTable {
            dates: dates_from(3),
            close: vec![100.0, 110.0, 121.0],
            returns: None,
            volatility: vec![],
        };
        let out = augment(table, 2);
        assert_approx(out.returns[1], 0.10);
        assert_eq!(out.volatility.len(), 1);
        assert_eq!(out.volatility[0].name, "volatility_2d");
        assert_approx(out.volatility[0].values[2], 0.0);
    }

    #[test]
    fn augment_preserves_existing_columns() {
        let table = PriceTable {
            dates: dates_from(2),
            close: vec![100.0, 200.0],
            returns: Some(vec![9.0, 9.0]),
            volatility: vec![VolatilityColumn {
                name: "volatility_30d".into(),
                values: vec![7.0, 7.0],
            }],
        };
        let out = augment(table, 7);
        // Neither column recomputed, no new volatility column added.
        assert_eq!(out.returns, vec![9.0, 9.0]);
        assert_eq!(out.volatility.len(), 1);
        assert_eq!(out.volatility[0].name, "volatility_30d");
        assert_eq!(out.volatility[0].values, vec![7.0, 7.0]);
    }

    #[test]
    fn zero_previous_price_yields_nan_return() {
        let r = simple_returns(&[0.0, 5.0]);
        assert!(r[1].is_nan());
    }

    #[test]
    fn short_series_is_all_nan_volatility() {
        let vol = rolling_population_std(&[0.1, 0.2], 5);
        assert!(vol.iter().all(|v| v.is_nan()));
    }
}
