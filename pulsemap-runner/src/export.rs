//! CSV artifact export.
//!
//! Writes the flat exchange files consumed by the plotting and mapping
//! collaborators. NaN cells are written as empty strings so the files
//! round-trip through the loader (empty reads back as NaN). Floats use
//! the shortest exact representation for the same reason.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pulsemap_core::aggregate::CountryTable;
use pulsemap_core::align::MergedTable;
use pulsemap_core::preprocess::ProcessedPrices;
use pulsemap_core::series::Series;
use pulsemap_core::stats::Correlogram;

use crate::geo::GeoRecord;
use crate::pipeline::{CorrelationReport, PreparedData};

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        format!("{v}")
    }
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Write `date, close, returns, volatility_*`.
pub fn write_processed_prices(path: &Path, prices: &ProcessedPrices) -> Result<()> {
    let mut wtr = writer(path)?;
    let mut header = vec!["date".to_string(), "close".to_string(), "returns".to_string()];
    header.extend(prices.volatility.iter().map(|c| c.name.clone()));
    wtr.write_record(&header)?;
    for (i, date) in prices.dates.iter().enumerate() {
        let mut row = vec![
            date.to_string(),
            fmt_value(prices.close[i]),
            fmt_value(prices.returns[i]),
        ];
        row.extend(prices.volatility.iter().map(|c| fmt_value(c.values[i])));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `date, global_interest`.
pub fn write_global_interest(path: &Path, global: &Series) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["date", "global_interest"])?;
    for point in global.points() {
        wtr.write_record([point.date.to_string(), fmt_value(point.value)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the wide pivot: `date` plus one column per country.
pub fn write_country_table(path: &Path, table: &CountryTable) -> Result<()> {
    let mut wtr = writer(path)?;
    let mut header = vec!["date".to_string()];
    header.extend(table.countries.iter().cloned());
    wtr.write_record(&header)?;
    for (i, date) in table.dates.iter().enumerate() {
        let mut row = vec![date.to_string()];
        row.extend(table.values[i].iter().map(|v| fmt_value(*v)));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the aligned table: `date`, its columns in table order.
pub fn write_merged(path: &Path, merged: &MergedTable) -> Result<()> {
    let mut wtr = writer(path)?;
    let mut header = vec!["date".to_string()];
    header.extend(merged.columns.iter().map(|(n, _)| n.clone()));
    wtr.write_record(&header)?;
    for (i, date) in merged.dates.iter().enumerate() {
        let mut row = vec![date.to_string()];
        row.extend(merged.columns.iter().map(|(_, v)| fmt_value(v[i])));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `lag, value, confidence` (the bound repeats on every row).
pub fn write_correlogram(path: &Path, correlogram: &Correlogram) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["lag", "value", "confidence"])?;
    for p in &correlogram.points {
        wtr.write_record([
            p.lag.to_string(),
            fmt_value(p.value),
            fmt_value(correlogram.confidence),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `date, iso3, country, interest`.
pub fn write_geo_records(path: &Path, records: &[GeoRecord]) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["date", "iso3", "country", "interest"])?;
    for r in records {
        wtr.write_record([
            r.date.to_string(),
            r.iso3.clone(),
            r.country.clone().unwrap_or_default(),
            fmt_value(r.interest),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the four prepared artifacts under `out_dir` with their standard
/// names. Returns the paths written.
pub fn save_prepared(out_dir: &Path, prepared: &PreparedData) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();

    let path = out_dir.join("processed_prices.csv");
    write_processed_prices(&path, &prepared.prices)?;
    written.push(path);

    let path = out_dir.join("interest_global.csv");
    write_global_interest(&path, &prepared.global)?;
    written.push(path);

    if let Some(by_country) = &prepared.by_country {
        let path = out_dir.join("interest_by_country.csv");
        write_country_table(&path, by_country)?;
        written.push(path);
    }

    let path = out_dir.join("merged.csv");
    write_merged(&path, &prepared.merged)?;
    written.push(path);

    Ok(written)
}

/// Write the correlogram artifacts under `out_dir`. Returns the paths
/// written.
pub fn save_correlations(out_dir: &Path, report: &CorrelationReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();

    let path = out_dir.join("acf_close.csv");
    write_correlogram(&path, &report.acf_close)?;
    written.push(path);

    let path = out_dir.join("acf_returns.csv");
    write_correlogram(&path, &report.acf_returns)?;
    written.push(path);

    if let Some((_, ccf)) = &report.ccf_interest_volatility {
        let path = out_dir.join("ccf_interest_volatility.csv");
        write_correlogram(&path, ccf)?;
        written.push(path);
    }

    Ok(written)
}
