//! Correlogram analyzers.
//!
//! `acf` and `ccf` each produce a [`Correlogram`]: an ordered sequence of
//! (lag, value) points plus one approximate 95% white-noise confidence
//! bound (`2/sqrt(n)`). Degenerate inputs (empty, constant, all-NaN) are
//! absorbed into 0.0 values so downstream plotting never sees NaN.

pub mod acf;
pub mod ccf;
pub mod moments;

pub use acf::acf;
pub use ccf::ccf;
pub use moments::{confidence_bound, nan_mean, nan_population_std, pearson, standardize};

use serde::Serialize;

/// One point of a correlogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelogramPoint {
    pub lag: i32,
    pub value: f64,
}

/// Ordered (lag, value) points plus one scalar confidence bound.
///
/// Lags run `0..=L` for ACF and `-L..=L` for CCF. The bound is returned
/// alongside the values; classifying points as significant is left to the
/// consumer.
#[derive(Debug, Clone, Serialize)]
pub struct Correlogram {
    pub points: Vec<CorrelogramPoint>,
    pub confidence: f64,
}

impl Correlogram {
    /// Value at an exact lag, if present.
    pub fn value_at(&self, lag: i32) -> Option<f64> {
        self.points.iter().find(|p| p.lag == lag).map(|p| p.value)
    }
}
