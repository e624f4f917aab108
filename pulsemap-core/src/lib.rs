//! PulseMap Core — temporal statistics over search-interest and price series.
//!
//! This crate contains the numerical heart of the pipeline:
//! - Dated series types with NaN-for-missing semantics
//! - Price preprocessing (returns, rolling volatility)
//! - Per-country interest aggregation (global mean, wide pivot)
//! - Temporal alignment (inner join on date)
//! - ACF/CCF correlograms with confidence bounds
//!
//! Every operation is a pure function: tables in, new tables out. Nothing
//! here performs I/O; loading and export live in `pulsemap-runner`.

pub mod aggregate;
pub mod align;
pub mod preprocess;
pub mod schema;
pub mod series;
pub mod stats;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: all core table types are Send + Sync.
    ///
    /// Analyzers may later run over multiple series concurrently; each one
    /// only needs an immutable snapshot of its input, so the types must
    /// cross thread boundaries freely.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<series::Series>();
        require_sync::<series::Series>();
        require_send::<preprocess::ProcessedPrices>();
        require_sync::<preprocess::ProcessedPrices>();
        require_send::<aggregate::CountryTable>();
        require_sync::<aggregate::CountryTable>();
        require_send::<align::MergedTable>();
        require_sync::<align::MergedTable>();
        require_send::<stats::Correlogram>();
        require_sync::<stats::Correlogram>();
    }
}
