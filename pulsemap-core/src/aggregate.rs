//! Per-country interest aggregation.
//!
//! Long-format interest observations reduce two ways: a global daily
//! series (mean over the countries observed on each date) and a wide
//! date × country pivot. Countries missing a date are excluded from the
//! mean and left as NaN cells in the pivot — never treated as zero.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::series::Series;

/// One long-format interest observation.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestRecord {
    pub date: NaiveDate,
    /// Absent when the input has no country column (single implicit
    /// global entity).
    pub country: Option<String>,
    pub interest: f64,
}

/// Wide date × country table. `values[date_idx][country_idx]` is NaN for
/// absent cells.
#[derive(Debug, Clone)]
pub struct CountryTable {
    pub dates: Vec<NaiveDate>,
    pub countries: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Mean interest per date over all observations on that date.
///
/// With no country column this is a passthrough of the single implicit
/// entity (a mean of one). NaN interest values are skipped.
pub fn global_interest(records: &[InterestRecord]) -> Series {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for r in records {
        if r.interest.is_nan() {
            continue;
        }
        let entry = by_date.entry(r.date).or_insert((0.0, 0));
        entry.0 += r.interest;
        entry.1 += 1;
    }
    Series::from_pairs(
        by_date
            .into_iter()
            .map(|(date, (sum, n))| (date, sum / n as f64)),
    )
}

/// Pivot long-format records into a wide date × country table.
///
/// Duplicate (date, country) observations are mean-merged. Returns `None`
/// when no record carries a country identifier.
pub fn pivot_by_country(records: &[InterestRecord]) -> Option<CountryTable> {
    let mut cells: BTreeMap<(NaiveDate, &str), (f64, usize)> = BTreeMap::new();
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut countries: BTreeSet<&str> = BTreeSet::new();

    for r in records {
        let Some(country) = r.country.as_deref() else {
            continue;
        };
        dates.insert(r.date);
        countries.insert(country);
        if r.interest.is_nan() {
            continue;
        }
        let entry = cells.entry((r.date, country)).or_insert((0.0, 0));
        entry.0 += r.interest;
        entry.1 += 1;
    }

    if countries.is_empty() {
        return None;
    }

    let dates: Vec<NaiveDate> = dates.into_iter().collect();
    let countries: Vec<String> = countries.iter().map(|c| c.to_string()).collect();
    let values = dates
        .iter()
        .map(|date| {
            countries
                .iter()
                .map(|country| {
                    cells
                        .get(&(*date, country.as_str()))
                        .map(|(sum, n)| sum / *n as f64)
                        .unwrap_or(f64::NAN)
                })
                .collect()
        })
        .collect();

    Some(CountryTable {
        dates,
        countries,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_util::assert_approx;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn rec(day: u32, country: &str, interest: f64) -> InterestRecord {
        InterestRecord {
            date: d(day),
            country: Some(country.to_string()),
            interest,
        }
    }

    #[test]
    fn global_mean_excludes_missing_countries() {
        // A: d1=10, d2=20; B: d1=30. d2 averages A alone.
        let records = vec![rec(1, "A", 10.0), rec(2, "A", 20.0), rec(1, "B", 30.0)];
        let g = global_interest(&records);
        assert_approx(g.get(d(1)).unwrap(), 20.0);
        assert_approx(g.get(d(2)).unwrap(), 20.0);
    }

    #[test]
    fn pivot_leaves_absent_cells_nan() {
        let records = vec![rec(1, "A", 10.0), rec(2, "A", 20.0), rec(1, "B", 30.0)];
        let table = pivot_by_country(&records).unwrap();
        assert_eq!(table.dates, vec![d(1), d(2)]);
        assert_eq!(table.countries, vec!["A".to_string(), "B".to_string()]);
        assert_approx(table.values[0][0], 10.0);
        assert_approx(table.values[0][1], 30.0);
        assert_approx(table.values[1][0], 20.0);
        assert!(table.values[1][1].is_nan());
    }

    #[test]
    fn pivot_mean_merges_duplicate_cells() {
        let records = vec![rec(1, "A", 10.0), rec(1, "A", 30.0)];
        let table = pivot_by_country(&records).unwrap();
        assert_approx(table.values[0][0], 20.0);
    }

    #[test]
    fn no_country_column_is_passthrough() {
        let records = vec![
            InterestRecord {
                date: d(1),
                country: None,
                interest: 42.0,
            },
            InterestRecord {
                date: d(2),
                country: None,
                interest: 7.0,
            },
        ];
        assert!(pivot_by_country(&records).is_none());
        let g = global_interest(&records);
        assert_approx(g.get(d(1)).unwrap(), 42.0);
        assert_approx(g.get(d(2)).unwrap(), 7.0);
    }

    #[test]
    fn nan_interest_is_skipped() {
        let records = vec![rec(1, "A", f64::NAN), rec(1, "B", 6.0)];
        let g = global_interest(&records);
        assert_approx(g.get(d(1)).unwrap(), 6.0);
    }
}
