//! Column-name validation for tabular inputs.
//!
//! The exchange format is untyped CSV, so validation is limited to the
//! presence of required columns. Several inputs carry legacy header
//! spellings (`Date` vs `date`, `Close` vs `close`), resolved here via
//! alias lists.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

/// Find the index of the first header matching any of `aliases`.
pub fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| a == h))
}

/// Resolve a required column, reporting it under its canonical name.
pub fn required_column(
    headers: &[String],
    canonical: &str,
    aliases: &[&str],
) -> Result<usize, SchemaError> {
    find_column(headers, aliases)
        .ok_or_else(|| SchemaError::MissingColumn(canonical.to_string()))
}
