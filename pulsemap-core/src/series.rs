//! Dated scalar series.
//!
//! A `Series` is an ordered sequence of (date, value) points, sorted
//! ascending by date, with at most one point per date. Missing values are
//! `f64::NAN`; calendar gaps are preserved, never interpolated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An ordered scalar series keyed by calendar date.
#[derive(Debug, Clone, Default)]
pub struct Series {
    points: Vec<TimePoint>,
}

impl Series {
    /// Build a series from unordered points. Sorts by date.
    ///
    /// Duplicate dates are a caller contract violation (inputs are
    /// deduplicated upstream); violations are caught in debug builds.
    pub fn new(mut points: Vec<TimePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        debug_assert!(
            points.windows(2).all(|w| w[0].date < w[1].date),
            "duplicate dates in series"
        );
        Self { points }
    }

    /// Build a series from (date, value) pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| TimePoint { date, value })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Values in date order (may contain NaN).
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Look up the value at an exact date.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }
}
