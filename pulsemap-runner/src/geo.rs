//! Geospatial identifier plumbing.
//!
//! The core pipeline only ever hands identifier strings to the map layer,
//! never geometry. This module completes missing ISO-3 codes from a
//! mapping table, produces the full and latest-date cuts consumed by the
//! choropleth renderer, and picks which GeoJSON property key best matches
//! a set of ISO-3 codes (real-world GeoJSON files disagree on where the
//! ISO code lives).

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::loader::{parse_date, parse_number, LoadError, DATE_ALIASES};
use pulsemap_core::schema::{find_column, required_column};

/// GeoJSON property keys that commonly hold an ISO-3 country code,
/// in preference order for ties.
pub const CANDIDATE_KEYS: &[&str] = &[
    "ADM0_A3",
    "ISO_A3",
    "WB_A3",
    "ADM0_A3_US",
    "ADM0_A3_UN",
    "SOV_A3",
];

/// One interest observation before ISO-3 normalization.
#[derive(Debug, Clone)]
pub struct RawGeoRecord {
    pub date: NaiveDate,
    pub interest: f64,
    pub iso3: Option<String>,
    pub country_code: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
}

/// One observation with a resolved ISO-3 code.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub date: NaiveDate,
    pub iso3: String,
    pub country: Option<String>,
    pub interest: f64,
}

/// Lookup table completing ISO-3 codes from `country_code` or `name`.
#[derive(Debug, Clone, Default)]
pub struct CountryMapping {
    by_code: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl CountryMapping {
    /// Read a mapping CSV with an `iso3` column plus `country_code`
    /// and/or `name` key columns.
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let rdr = csv::Reader::from_path(path).map_err(|e| LoadError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(rdr, path)
    }

    fn parse<R: Read>(mut rdr: csv::Reader<R>, path: &Path) -> Result<Self, LoadError> {
        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| LoadError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let iso3_idx = required_column(&headers, "iso3", &["iso3"]).map_err(|e| {
            LoadError::Schema {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        let code_idx = find_column(&headers, &["country_code"]);
        let name_idx = find_column(&headers, &["name"]);

        let mut mapping = Self::default();
        for record in rdr.records() {
            let record = record.map_err(|e| LoadError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
            let Some(iso3) = record.get(iso3_idx).map(str::trim).filter(|s| !s.is_empty())
            else {
                continue;
            };
            let iso3 = iso3.to_uppercase();
            if let Some(code) = code_idx.and_then(|i| record.get(i)).map(str::trim) {
                if !code.is_empty() {
                    mapping.by_code.entry(code.to_string()).or_insert_with(|| iso3.clone());
                }
            }
            if let Some(name) = name_idx.and_then(|i| record.get(i)).map(str::trim) {
                if !name.is_empty() {
                    mapping.by_name.entry(name.to_string()).or_insert_with(|| iso3.clone());
                }
            }
        }
        Ok(mapping)
    }

    fn resolve(&self, record: &RawGeoRecord) -> Option<String> {
        if let Some(code) = record.country_code.as_deref() {
            if let Some(iso3) = self.by_code.get(code) {
                return Some(iso3.clone());
            }
        }
        if let Some(name) = record.name.as_deref() {
            if let Some(iso3) = self.by_name.get(name) {
                return Some(iso3.clone());
            }
        }
        None
    }
}

/// Read a geo-enriched interest CSV (`date`, `interest`, plus any of
/// `iso3`, `country_code`, `name`, `country`).
pub fn read_geo_records(path: &Path) -> Result<Vec<RawGeoRecord>, LoadError> {
    let rdr = csv::Reader::from_path(path).map_err(|e| LoadError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_geo_records(rdr, path)
}

fn parse_geo_records<R: Read>(
    mut rdr: csv::Reader<R>,
    path: &Path,
) -> Result<Vec<RawGeoRecord>, LoadError> {
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| LoadError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let date_idx = required_column(&headers, "date", DATE_ALIASES).map_err(|e| {
        LoadError::Schema {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    let interest_idx = required_column(&headers, "interest", &["interest"]).map_err(|e| {
        LoadError::Schema {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    let iso3_idx = find_column(&headers, &["iso3"]);
    let code_idx = find_column(&headers, &["country_code"]);
    let name_idx = find_column(&headers, &["name"]);
    let country_idx = find_column(&headers, &["country"]);

    let optional = |record: &csv::StringRecord, idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let mut records = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| LoadError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        let row_num = i + 2;
        records.push(RawGeoRecord {
            date: parse_date(record.get(date_idx).unwrap_or(""), path, row_num)?,
            interest: parse_number(&record, interest_idx, &headers, path, row_num)?,
            iso3: optional(&record, iso3_idx),
            country_code: optional(&record, code_idx),
            name: optional(&record, name_idx),
            country: optional(&record, country_idx),
        });
    }
    Ok(records)
}

/// Resolve ISO-3 codes, dropping records that cannot be resolved.
///
/// A code already present on the record wins; otherwise the mapping is
/// probed by `country_code`, then by `name`. Codes are uppercased.
pub fn normalize_iso3(
    records: Vec<RawGeoRecord>,
    mapping: Option<&CountryMapping>,
) -> Vec<GeoRecord> {
    let total = records.len();
    let normalized: Vec<GeoRecord> = records
        .into_iter()
        .filter_map(|r| {
            let iso3 = r
                .iso3
                .clone()
                .or_else(|| mapping.and_then(|m| m.resolve(&r)))?;
            Some(GeoRecord {
                date: r.date,
                iso3: iso3.to_uppercase(),
                country: r.country.or(r.name),
                interest: r.interest,
            })
        })
        .collect();
    if normalized.len() < total {
        log::warn!(
            "dropped {} of {} rows with unresolvable ISO-3 codes",
            total - normalized.len(),
            total
        );
    }
    normalized
}

/// Rows at the most recent date (for the static map).
pub fn latest_cut(records: &[GeoRecord]) -> Vec<GeoRecord> {
    let Some(latest) = records.iter().map(|r| r.date).max() else {
        return Vec::new();
    };
    records.iter().filter(|r| r.date == latest).cloned().collect()
}

/// The winning GeoJSON property key and how many codes it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureKeyMatch {
    pub key: String,
    pub overlap: usize,
}

/// Pick the candidate property key whose values overlap the dataset's
/// ISO-3 codes the most.
///
/// Null, empty, and `-99` placeholder values (Natural Earth's marker for
/// "no code") are ignored. Ties keep the earlier candidate. Returns
/// `None` when the document has no `features` array.
pub fn detect_feature_key(
    geojson: &serde_json::Value,
    iso3_codes: &BTreeSet<String>,
) -> Option<FeatureKeyMatch> {
    let features = geojson.get("features")?.as_array()?;

    let mut best: Option<FeatureKeyMatch> = None;
    for key in CANDIDATE_KEYS {
        let mut codes: BTreeSet<String> = BTreeSet::new();
        for feature in features {
            let Some(value) = feature.get("properties").and_then(|p| p.get(*key)) else {
                continue;
            };
            let Some(code) = value.as_str() else {
                continue;
            };
            let code = code.to_uppercase();
            if code.is_empty() || code == "-99" {
                continue;
            }
            codes.insert(code);
        }
        let overlap = codes.intersection(iso3_codes).count();
        if best.as_ref().map_or(true, |b| overlap > b.overlap) {
            best = Some(FeatureKeyMatch {
                key: key.to_string(),
                overlap,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn raw(day: u32, iso3: Option<&str>, code: Option<&str>, name: Option<&str>) -> RawGeoRecord {
        RawGeoRecord {
            date: d(day),
            interest: 50.0,
            iso3: iso3.map(String::from),
            country_code: code.map(String::from),
            name: name.map(String::from),
            country: name.map(String::from),
        }
    }

    fn mapping() -> CountryMapping {
        let csv = "country_code,name,iso3\nAR,Argentina,ARG\nMX,Mexico,MEX\n";
        CountryMapping::parse(
            csv::Reader::from_reader(csv.as_bytes()),
            &PathBuf::from("map.csv"),
        )
        .unwrap()
    }

    #[test]
    fn existing_iso3_wins_over_mapping() {
        let out = normalize_iso3(vec![raw(1, Some("bra"), Some("AR"), None)], Some(&mapping()));
        assert_eq!(out[0].iso3, "BRA");
    }

    #[test]
    fn mapping_fills_by_code_then_name() {
        let records = vec![
            raw(1, None, Some("MX"), None),
            raw(1, None, None, Some("Argentina")),
            raw(1, None, Some("??"), Some("Atlantis")),
        ];
        let out = normalize_iso3(records, Some(&mapping()));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].iso3, "MEX");
        assert_eq!(out[1].iso3, "ARG");
    }

    #[test]
    fn unmapped_rows_drop_without_mapping_table() {
        let out = normalize_iso3(vec![raw(1, None, Some("AR"), None)], None);
        assert!(out.is_empty());
    }

    #[test]
    fn latest_cut_keeps_only_max_date() {
        let records = normalize_iso3(
            vec![
                raw(1, Some("ARG"), None, None),
                raw(3, Some("ARG"), None, None),
                raw(3, Some("MEX"), None, None),
            ],
            None,
        );
        let latest = latest_cut(&records);
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|r| r.date == d(3)));
        assert!(latest_cut(&[]).is_empty());
    }

    #[test]
    fn feature_key_detection_prefers_max_overlap() {
        let geojson: serde_json::Value = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {"properties": {"ADM0_A3": "-99", "ISO_A3": "ARG"}},
                {"properties": {"ADM0_A3": "MEX", "ISO_A3": "MEX"}},
                {"properties": {"ADM0_A3": "",    "ISO_A3": "BRA"}},
            ]
        });
        let codes: BTreeSet<String> =
            ["ARG", "MEX", "BRA"].iter().map(|s| s.to_string()).collect();
        let found = detect_feature_key(&geojson, &codes).unwrap();
        assert_eq!(found.key, "ISO_A3");
        assert_eq!(found.overlap, 3);
    }

    #[test]
    fn no_features_array_is_none() {
        let geojson = serde_json::json!({"type": "FeatureCollection"});
        assert!(detect_feature_key(&geojson, &BTreeSet::new()).is_none());
    }

    #[test]
    fn zero_overlap_still_reports_first_candidate() {
        let geojson = serde_json::json!({"features": [{"properties": {"ISO_A3": "FRA"}}]});
        let codes: BTreeSet<String> = ["ARG".to_string()].into_iter().collect();
        let found = detect_feature_key(&geojson, &codes).unwrap();
        assert_eq!(found.key, "ADM0_A3");
        assert_eq!(found.overlap, 0);
    }

    #[test]
    fn geo_csv_requires_date_and_interest() {
        let csv = "iso3,interest\nARG,10\n";
        let err = parse_geo_records(
            csv::Reader::from_reader(csv.as_bytes()),
            &PathBuf::from("geo.csv"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("date"));
    }
}
