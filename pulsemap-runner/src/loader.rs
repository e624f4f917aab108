//! CSV ingestion with header aliasing and schema validation.
//!
//! Input files come from several upstream exporters, so headers arrive in
//! more than one spelling (`Date`/`date`, `Close`/`close`/`price`). Schema
//! validation happens against the header row before any data row is
//! parsed; a missing required column is fatal. Empty cells load as NaN.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use pulsemap_core::aggregate::InterestRecord;
use pulsemap_core::align::MergedTable;
use pulsemap_core::preprocess::{PriceTable, VolatilityColumn};
use pulsemap_core::schema::{find_column, required_column, SchemaError};

pub(crate) const DATE_ALIASES: &[&str] = &["date", "Date"];
const PRICE_ALIASES: &[&str] = &["close", "Close", "price", "Price"];

/// Errors from the CSV loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("{path} row {row}: unparseable date '{value}' (expected YYYY-MM-DD)")]
    BadDate {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{path} row {row}, column '{column}': unparseable number '{value}'")]
    BadNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
}

impl LoadError {
    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    fn schema(path: &Path, source: SchemaError) -> Self {
        Self::Schema {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a price CSV into a [`PriceTable`], rows sorted by date.
///
/// Requires a date and a price column; pre-existing `returns` and
/// `volatility_*` columns are carried through so the preprocessor can
/// honor its preserve-if-present policy.
pub fn read_prices(path: &Path) -> Result<PriceTable, LoadError> {
    let rdr = csv::Reader::from_path(path).map_err(|e| LoadError::csv(path, e))?;
    parse_prices(rdr, path)
}

fn parse_prices<R: Read>(mut rdr: csv::Reader<R>, path: &Path) -> Result<PriceTable, LoadError> {
    let headers = header_row(&mut rdr, path)?;
    let date_idx =
        required_column(&headers, "date", DATE_ALIASES).map_err(|e| LoadError::schema(path, e))?;
    let close_idx = required_column(&headers, "price", PRICE_ALIASES)
        .map_err(|e| LoadError::schema(path, e))?;
    let returns_idx = find_column(&headers, &["returns"]);
    let vol_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with("volatility_"))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    struct Row {
        date: NaiveDate,
        close: f64,
        returns: f64,
        vols: Vec<f64>,
    }

    let mut rows: Vec<Row> = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| LoadError::csv(path, e))?;
        let row_num = i + 2; // 1-based, after the header
        let date = parse_date(record.get(date_idx).unwrap_or(""), path, row_num)?;
        let close = parse_number(&record, close_idx, &headers, path, row_num)?;
        let returns = match returns_idx {
            Some(idx) => parse_number(&record, idx, &headers, path, row_num)?,
            None => f64::NAN,
        };
        let vols = vol_columns
            .iter()
            .map(|(idx, _)| parse_number(&record, *idx, &headers, path, row_num))
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(Row {
            date,
            close,
            returns,
            vols,
        });
    }
    rows.sort_by_key(|r| r.date);

    let volatility = vol_columns
        .iter()
        .enumerate()
        .map(|(j, (_, name))| VolatilityColumn {
            name: name.clone(),
            values: rows.iter().map(|r| r.vols[j]).collect(),
        })
        .collect();

    Ok(PriceTable {
        dates: rows.iter().map(|r| r.date).collect(),
        close: rows.iter().map(|r| r.close).collect(),
        returns: returns_idx.map(|_| rows.iter().map(|r| r.returns).collect()),
        volatility,
    })
}

/// Read an interest CSV into long-format records.
///
/// Requires `date` and `interest`; `country` is optional (absent means a
/// single implicit global entity).
pub fn read_interest(path: &Path) -> Result<Vec<InterestRecord>, LoadError> {
    let rdr = csv::Reader::from_path(path).map_err(|e| LoadError::csv(path, e))?;
    parse_interest(rdr, path)
}

fn parse_interest<R: Read>(
    mut rdr: csv::Reader<R>,
    path: &Path,
) -> Result<Vec<InterestRecord>, LoadError> {
    let headers = header_row(&mut rdr, path)?;
    let date_idx =
        required_column(&headers, "date", DATE_ALIASES).map_err(|e| LoadError::schema(path, e))?;
    let interest_idx = required_column(&headers, "interest", &["interest"])
        .map_err(|e| LoadError::schema(path, e))?;
    let country_idx = find_column(&headers, &["country", "Country"]);

    let mut records = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| LoadError::csv(path, e))?;
        let row_num = i + 2;
        let date = parse_date(record.get(date_idx).unwrap_or(""), path, row_num)?;
        let interest = parse_number(&record, interest_idx, &headers, path, row_num)?;
        let country = country_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        records.push(InterestRecord {
            date,
            country,
            interest,
        });
    }
    records.sort_by_key(|r| r.date);
    Ok(records)
}

/// Read a previously exported merged table: `date` plus any number of
/// numeric columns, preserved in file order.
pub fn read_merged(path: &Path) -> Result<MergedTable, LoadError> {
    let rdr = csv::Reader::from_path(path).map_err(|e| LoadError::csv(path, e))?;
    parse_merged(rdr, path)
}

fn parse_merged<R: Read>(mut rdr: csv::Reader<R>, path: &Path) -> Result<MergedTable, LoadError> {
    let headers = header_row(&mut rdr, path)?;
    let date_idx =
        required_column(&headers, "date", DATE_ALIASES).map_err(|e| LoadError::schema(path, e))?;
    let value_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| LoadError::csv(path, e))?;
        let row_num = i + 2;
        let date = parse_date(record.get(date_idx).unwrap_or(""), path, row_num)?;
        let values = value_columns
            .iter()
            .map(|(idx, _)| parse_number(&record, *idx, &headers, path, row_num))
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push((date, values));
    }
    rows.sort_by_key(|(date, _)| *date);

    let columns = value_columns
        .iter()
        .enumerate()
        .map(|(j, (_, name))| {
            let values = rows.iter().map(|(_, vals)| vals[j]).collect();
            (name.clone(), values)
        })
        .collect();

    Ok(MergedTable {
        dates: rows.into_iter().map(|(date, _)| date).collect(),
        columns,
    })
}

fn header_row<R: Read>(rdr: &mut csv::Reader<R>, path: &Path) -> Result<Vec<String>, LoadError> {
    Ok(rdr
        .headers()
        .map_err(|e| LoadError::csv(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

pub(crate) fn parse_date(value: &str, path: &Path, row: usize) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| LoadError::BadDate {
        path: path.to_path_buf(),
        row,
        value: value.to_string(),
    })
}

/// Parse one numeric cell; empty cells are NaN (missing observation).
pub(crate) fn parse_number(
    record: &csv::StringRecord,
    idx: usize,
    headers: &[String],
    path: &Path,
    row: usize,
) -> Result<f64, LoadError> {
    let raw = record.get(idx).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| LoadError::BadNumber {
        path: path.to_path_buf(),
        row,
        column: headers.get(idx).cloned().unwrap_or_default(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(text.as_bytes())
    }

    fn fake_path() -> PathBuf {
        PathBuf::from("test.csv")
    }

    #[test]
    fn prices_with_legacy_headers() {
        let csv = "Date,Close\n2024-01-02,110.0\n2024-01-01,100.0\n";
        let table = parse_prices(reader(csv), &fake_path()).unwrap();
        // Sorted by date even though the file was not.
        assert_eq!(table.close, vec![100.0, 110.0]);
        assert!(table.returns.is_none());
        assert!(table.volatility.is_empty());
    }

    #[test]
    fn prices_carry_precomputed_columns() {
        let csv = "date,price,returns,volatility_7d\n\
                   2024-01-01,100.0,,\n\
                   2024-01-02,110.0,0.1,0.05\n";
        let table = parse_prices(reader(csv), &fake_path()).unwrap();
        let returns = table.returns.unwrap();
        assert!(returns[0].is_nan());
        assert_eq!(returns[1], 0.1);
        assert_eq!(table.volatility[0].name, "volatility_7d");
        assert_eq!(table.volatility[0].values[1], 0.05);
    }

    #[test]
    fn missing_date_column_is_schema_error() {
        let csv = "close\n100.0\n";
        let err = parse_prices(reader(csv), &fake_path()).unwrap_err();
        assert!(matches!(err, LoadError::Schema { .. }));
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn missing_interest_column_is_schema_error() {
        let csv = "date,country\n2024-01-01,AR\n";
        let err = parse_interest(reader(csv), &fake_path()).unwrap_err();
        assert!(err.to_string().contains("interest"));
    }

    #[test]
    fn interest_without_country_column() {
        let csv = "date,interest\n2024-01-01,55\n";
        let records = parse_interest(reader(csv), &fake_path()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].country.is_none());
        assert_eq!(records[0].interest, 55.0);
    }

    #[test]
    fn garbage_number_is_reported_with_context() {
        let csv = "date,interest\n2024-01-01,high\n";
        let err = parse_interest(reader(csv), &fake_path()).unwrap_err();
        match err {
            LoadError::BadNumber { row, column, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "interest");
                assert_eq!(value, "high");
            }
            other => panic!("expected BadNumber, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_rejected() {
        let csv = "date,interest\n01/02/2024,3\n";
        let err = parse_interest(reader(csv), &fake_path()).unwrap_err();
        assert!(matches!(err, LoadError::BadDate { .. }));
    }

    #[test]
    fn merged_table_round_trip_columns() {
        let csv = "date,volatility_7d,global_interest\n\
                   2024-01-01,0.01,40\n\
                   2024-01-02,0.02,40.5\n";
        let merged = parse_merged(reader(csv), &fake_path()).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.volatility_names(), vec!["volatility_7d"]);
        assert_eq!(merged.column("global_interest").unwrap(), &[40.0, 40.5]);
    }
}
