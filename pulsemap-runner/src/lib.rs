//! PulseMap Runner — pipeline orchestration around `pulsemap-core`.
//!
//! This crate builds on the core statistics engine to provide:
//! - CSV loading with header aliasing and schema validation
//! - The prepare/correlate pipeline stages
//! - CSV artifact export
//! - Geospatial identifier normalization and GeoJSON feature-key detection
//! - TOML configuration with defaults

pub mod config;
pub mod export;
pub mod geo;
pub mod loader;
pub mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use geo::{detect_feature_key, latest_cut, normalize_iso3, CountryMapping, FeatureKeyMatch};
pub use loader::{read_interest, read_merged, read_prices, LoadError};
pub use pipeline::{correlate, prepare, CorrelationReport, PreparedData};
