//! Temporal alignment of price-derived and interest series.
//!
//! An inner join on the date key: only dates present in both inputs
//! survive. Lag arithmetic downstream assumes a common support, so a date
//! with a missing counterpart must not slip through and silently shift
//! alignment.

use chrono::NaiveDate;

use crate::preprocess::ProcessedPrices;
use crate::series::Series;

/// Join outcome counters, reported alongside the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinStats {
    pub price_rows: usize,
    pub interest_rows: usize,
    pub merged_rows: usize,
}

impl JoinStats {
    /// True when the join kept less than half of the smaller input.
    pub fn is_sparse(&self) -> bool {
        let smaller = self.price_rows.min(self.interest_rows);
        smaller > 0 && self.merged_rows * 2 < smaller
    }
}

/// A merged multi-series table on a common date axis.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub dates: Vec<NaiveDate>,
    /// Named columns, each the same length as `dates`.
    pub columns: Vec<(String, Vec<f64>)>,
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Names of the `volatility_*` columns, in table order.
    pub fn volatility_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(|n| n.starts_with("volatility_"))
            .collect()
    }
}

/// Inner-join the volatility columns of `prices` with the global interest
/// series on date.
///
/// With zero volatility columns the join still succeeds and the table
/// carries only `global_interest`; volatility-dependent analyses are
/// skipped by the caller. A sparse overlap is surfaced as a warning,
/// never an error.
pub fn merge_on_date(prices: &ProcessedPrices, interest: &Series) -> (MergedTable, JoinStats) {
    // Both date axes are sorted; walk the price axis and probe the series.
    let mut dates = Vec::new();
    let mut row_indices = Vec::new();
    let mut interest_values = Vec::new();
    for (i, date) in prices.dates.iter().enumerate() {
        if let Some(value) = interest.get(*date) {
            dates.push(*date);
            row_indices.push(i);
            interest_values.push(value);
        }
    }

    let mut columns: Vec<(String, Vec<f64>)> = prices
        .volatility
        .iter()
        .map(|col| {
            let values = row_indices.iter().map(|&i| col.values[i]).collect();
            (col.name.clone(), values)
        })
        .collect();
    columns.push(("global_interest".to_string(), interest_values));

    let stats = JoinStats {
        price_rows: prices.dates.len(),
        interest_rows: interest.len(),
        merged_rows: dates.len(),
    };
    if stats.is_sparse() {
        log::warn!(
            "date alignment kept only {} of {} price rows and {} interest rows; \
             check that the inputs cover the same period",
            stats.merged_rows,
            stats.price_rows,
            stats.interest_rows
        );
    }

    (MergedTable { dates, columns }, stats)
}
