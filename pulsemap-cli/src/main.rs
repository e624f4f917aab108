//! PulseMap CLI — prepare, correlate, and geo commands.
//!
//! Commands:
//! - `prepare` — preprocess prices, aggregate interest, align on date,
//!   write the four prepared CSVs
//! - `correlate` — compute ACF/CCF correlograms from prepared artifacts
//! - `geo` — resolve ISO-3 codes, write full/latest cuts, report the best
//!   GeoJSON feature key

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pulsemap_core::preprocess::augment;
use pulsemap_runner::{
    detect_feature_key, export, latest_cut, loader, normalize_iso3, pipeline, CountryMapping,
    PipelineConfig,
};

#[derive(Parser)]
#[command(
    name = "pulsemap",
    about = "PulseMap CLI — search-interest vs. volatility temporal statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess prices and interest, align them, and write prepared CSVs.
    Prepare {
        /// Price CSV (date, close; optional returns/volatility columns).
        #[arg(long)]
        prices: PathBuf,

        /// Interest CSV (date, interest; optional country).
        #[arg(long)]
        trends: PathBuf,

        /// Output directory for the prepared artifacts.
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,

        /// Rolling volatility window (overrides config).
        #[arg(long)]
        vol_window: Option<usize>,

        /// Optional TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compute ACF/CCF correlograms from prepared artifacts.
    Correlate {
        /// Directory holding the prepared artifacts.
        #[arg(long, default_value = "outputs")]
        in_dir: PathBuf,

        /// Output directory for the correlogram CSVs.
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,

        /// Maximum lag (overrides config).
        #[arg(long)]
        max_lag: Option<usize>,

        /// Optional TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Resolve ISO-3 codes and write full/latest geographic cuts.
    Geo {
        /// Interest CSV with geographic identifier columns.
        #[arg(long)]
        trends: PathBuf,

        /// Optional mapping CSV (country_code/name to iso3).
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Optional GeoJSON for feature-key detection.
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// Output path for the full cut.
        #[arg(long, default_value = "outputs/trends_geo_full.csv")]
        out_full: PathBuf,

        /// Output path for the latest-date cut.
        #[arg(long, default_value = "outputs/trends_geo_latest.csv")]
        out_latest: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Prepare {
            prices,
            trends,
            out_dir,
            vol_window,
            config,
        } => cmd_prepare(prices, trends, out_dir, vol_window, config),
        Commands::Correlate {
            in_dir,
            out_dir,
            max_lag,
            config,
        } => cmd_correlate(in_dir, out_dir, max_lag, config),
        Commands::Geo {
            trends,
            mapping,
            geojson,
            out_full,
            out_latest,
        } => cmd_geo(trends, mapping, geojson, out_full, out_latest),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            PipelineConfig::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn cmd_prepare(
    prices_path: PathBuf,
    trends_path: PathBuf,
    out_dir: PathBuf,
    vol_window: Option<usize>,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(window) = vol_window {
        config.vol_window = window;
    }
    config.validate()?;

    let prices = loader::read_prices(&prices_path)?;
    let interest = loader::read_interest(&trends_path)?;
    let prepared = pipeline::prepare(prices, &interest, config.vol_window);

    let written = export::save_prepared(&out_dir, &prepared)?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    println!(
        "aligned {} rows (from {} price rows, {} interest dates)",
        prepared.join_stats.merged_rows,
        prepared.join_stats.price_rows,
        prepared.join_stats.interest_rows
    );
    Ok(())
}

fn cmd_correlate(
    in_dir: PathBuf,
    out_dir: PathBuf,
    max_lag: Option<usize>,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(lag) = max_lag {
        config.max_lag = lag;
    }
    config.validate()?;

    // Prepared prices already carry returns/volatility, so augment is a
    // passthrough here; it only fills columns if someone hands us a raw file.
    let prices = loader::read_prices(&in_dir.join("processed_prices.csv"))?;
    let prices = augment(prices, config.vol_window);
    let merged = loader::read_merged(&in_dir.join("merged.csv"))?;

    let report = pipeline::correlate(&prices, &merged, config.max_lag);
    let written = export::save_correlations(&out_dir, &report)?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    if report.ccf_interest_volatility.is_none() {
        println!("no volatility column found; CCF skipped");
    }
    Ok(())
}

fn cmd_geo(
    trends: PathBuf,
    mapping: Option<PathBuf>,
    geojson: Option<PathBuf>,
    out_full: PathBuf,
    out_latest: PathBuf,
) -> Result<()> {
    let records = pulsemap_runner::geo::read_geo_records(&trends)?;
    let mapping = mapping.as_deref().map(CountryMapping::read).transpose()?;
    let normalized = normalize_iso3(records, mapping.as_ref());

    if let Some(parent) = out_full.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    export::write_geo_records(&out_full, &normalized)?;
    println!("wrote {} ({} rows)", out_full.display(), normalized.len());

    let latest = latest_cut(&normalized);
    export::write_geo_records(&out_latest, &latest)?;
    println!("wrote {} ({} rows)", out_latest.display(), latest.len());

    if let Some(geojson_path) = geojson {
        let text = std::fs::read_to_string(&geojson_path)
            .with_context(|| format!("failed to read {}", geojson_path.display()))?;
        let document: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", geojson_path.display()))?;
        let codes: BTreeSet<String> = normalized.iter().map(|r| r.iso3.clone()).collect();
        match detect_feature_key(&document, &codes) {
            Some(found) if found.overlap > 0 => println!(
                "geojson feature key: properties.{} ({} of {} codes matched)",
                found.key,
                found.overlap,
                codes.len()
            ),
            _ => println!("no geojson property key matches the dataset's ISO-3 codes"),
        }
    }
    Ok(())
}
