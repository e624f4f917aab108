//! Pipeline stages over already-loaded tables.
//!
//! Two stages, matching the two halves of the historical pipeline:
//! `prepare` (preprocess + aggregate + align) and `correlate` (ACF/CCF
//! over the prepared artifacts). Both are pure; loading and export live
//! in `loader` and `export`.

use pulsemap_core::aggregate::{global_interest, pivot_by_country, CountryTable, InterestRecord};
use pulsemap_core::align::{merge_on_date, JoinStats, MergedTable};
use pulsemap_core::preprocess::{augment, PriceTable, ProcessedPrices};
use pulsemap_core::series::Series;
use pulsemap_core::stats::{acf, ccf, Correlogram};

/// Everything produced by the prepare stage.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub prices: ProcessedPrices,
    pub global: Series,
    pub by_country: Option<CountryTable>,
    pub merged: MergedTable,
    pub join_stats: JoinStats,
}

/// Correlograms produced by the correlate stage.
#[derive(Debug, Clone)]
pub struct CorrelationReport {
    pub acf_close: Correlogram,
    pub acf_returns: Correlogram,
    /// CCF of `global_interest` against the first volatility column, tagged
    /// with that column's name. Absent when the merged table carries no
    /// volatility column.
    pub ccf_interest_volatility: Option<(String, Correlogram)>,
}

/// Preprocess prices, aggregate interest, and align the two on date.
pub fn prepare(prices: PriceTable, interest: &[InterestRecord], vol_window: usize) -> PreparedData {
    let prices = augment(prices, vol_window);
    log::info!(
        "preprocessed {} price rows ({} volatility column(s))",
        prices.dates.len(),
        prices.volatility.len()
    );

    let global = global_interest(interest);
    let by_country = pivot_by_country(interest);
    log::info!(
        "aggregated {} interest observations over {} dates",
        interest.len(),
        global.len()
    );

    let (merged, join_stats) = merge_on_date(&prices, &global);
    log::info!("aligned table has {} rows", merged.len());

    PreparedData {
        prices,
        global,
        by_country,
        merged,
        join_stats,
    }
}

/// Compute ACFs of the price level and returns, and the CCF of global
/// interest against volatility.
pub fn correlate(
    prices: &ProcessedPrices,
    merged: &MergedTable,
    max_lag: usize,
) -> CorrelationReport {
    let acf_close = acf(&prices.close, max_lag);
    let acf_returns = acf(&prices.returns, max_lag);

    let ccf_interest_volatility = merged
        .volatility_names()
        .first()
        .map(|n| n.to_string())
        .and_then(|vol_name| {
            let interest = merged.column("global_interest")?;
            let vol = merged.column(&vol_name)?;
            Some((vol_name, ccf(interest, vol, max_lag)))
        });
    if ccf_interest_volatility.is_none() {
        log::info!("no volatility column in merged table; skipping CCF");
    }

    CorrelationReport {
        acf_close,
        acf_returns,
        ccf_interest_volatility,
    }
}
