//! Historical dataset ingest and trend filtering.
//!
//! This module turns a WFP-style food-prices CSV into clean
//! `HistoricalRecord`s plus the selector catalogs derived from them.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no encoding or prediction logic here

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Catalog, Field, HistoricalRecord};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 10] = [
    "date",
    "admin1",
    "admin2",
    "market",
    "category",
    "commodity",
    "unit",
    "priceflag",
    "pricetype",
    "price",
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Summary stats about the records actually loaded.
#[derive(Debug, Clone)]
pub struct HistoryStats {
    pub n_records: usize,
    pub date_min: NaiveDate,
    pub date_max: NaiveDate,
    pub price_min: f64,
    pub price_max: f64,
}

/// Ingest output: records + catalogs + stats + row errors.
#[derive(Debug, Clone)]
pub struct HistoryData {
    pub records: Vec<HistoricalRecord>,
    pub catalog: Catalog,
    pub stats: HistoryStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and normalize the historical dataset.
///
/// Malformed rows are skipped and reported through `row_errors`; WFP exports
/// carry an HXL tag row (`#date,#adm1+name,…`) directly under the header,
/// which fails date parsing and is dropped like any other bad row.
pub fn load_history(path: &Path) -> Result<HistoryData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open dataset '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::input(format!("Missing required column: `{name}`")));
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = records.len();
    let stats = compute_stats(&records)
        .ok_or_else(|| AppError::no_data("No valid rows remain after validation."))?;
    let catalog = build_catalog(&records);

    Ok(HistoryData {
        records,
        catalog,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Records matching (commodity, region, market) exactly, date-ascending.
///
/// An empty result is the "no data" signal; it is never an error.
pub fn filter_trend(
    records: &[HistoricalRecord],
    commodity: &str,
    region: &str,
    market: &str,
) -> Vec<HistoricalRecord> {
    let mut out: Vec<HistoricalRecord> = records
        .iter()
        .filter(|r| r.commodity == commodity && r.region == region && r.market == market)
        .cloned()
        .collect();
    out.sort_by_key(|r| r.date);
    out
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿date"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<HistoricalRecord, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;

    let region = get_required(record, header_map, "admin1")?.to_string();
    let district = get_required(record, header_map, "admin2")?.to_string();
    let market = get_required(record, header_map, "market")?.to_string();
    let category = get_required(record, header_map, "category")?.to_string();
    let commodity = get_required(record, header_map, "commodity")?.to_string();
    let unit = get_required(record, header_map, "unit")?.to_string();
    let priceflag = get_required(record, header_map, "priceflag")?.to_string();
    let pricetype = get_required(record, header_map, "pricetype")?.to_string();

    let price_raw = get_required(record, header_map, "price")?;
    let price = price_raw
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| format!("Invalid `price` value '{price_raw}'."))?;

    Ok(HistoricalRecord {
        date,
        region,
        district,
        market,
        category,
        commodity,
        unit,
        priceflag,
        pricetype,
        price,
    })
}

/// Distinct sorted values per categorical field.
pub fn build_catalog(records: &[HistoricalRecord]) -> Catalog {
    fn distinct(records: &[HistoricalRecord], pick: fn(&HistoricalRecord) -> &str) -> Vec<String> {
        let set: BTreeSet<&str> = records.iter().map(pick).collect();
        set.into_iter().map(str::to_string).collect()
    }

    Catalog {
        regions: distinct(records, |r| r.region.as_str()),
        districts: distinct(records, |r| r.district.as_str()),
        markets: distinct(records, |r| r.market.as_str()),
        categories: distinct(records, |r| r.category.as_str()),
        commodities: distinct(records, |r| r.commodity.as_str()),
        units: distinct(records, |r| r.unit.as_str()),
        priceflags: distinct(records, |r| r.priceflag.as_str()),
        pricetypes: distinct(records, |r| r.pricetype.as_str()),
    }
}

fn compute_stats(records: &[HistoricalRecord]) -> Option<HistoryStats> {
    let date_min = records.iter().map(|r| r.date).min()?;
    let date_max = records.iter().map(|r| r.date).max()?;

    let mut price_min = f64::INFINITY;
    let mut price_max = f64::NEG_INFINITY;
    for r in records {
        price_min = price_min.min(r.price);
        price_max = price_max.max(r.price);
    }
    if !price_min.is_finite() || !price_max.is_finite() {
        return None;
    }

    Some(HistoryStats {
        n_records: records.len(),
        date_min,
        date_max,
        price_min,
        price_max,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // WFP exports use ISO dates (`YYYY-MM-DD`), but hand-edited files often
    // carry `DD/MM/YYYY` or `DD-MM-YYYY`. We accept a small set of common
    // formats to reduce friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

/// Catalog lookup that tolerates a missing field without panicking.
pub fn first_option(catalog: &Catalog, field: Field) -> Option<&str> {
    catalog.options(field).first().map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const HEADER: &str = "date,admin1,admin2,market,category,commodity,unit,priceflag,pricetype,price";

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{HEADER}").unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        f
    }

    #[test]
    fn loads_rows_and_builds_sorted_catalog() {
        let f = write_csv(&[
            "2023-01-15,Mbeya,Mbeya City,Mwanjelwa,cereals and tubers,Maize,KG,actual,Retail,850",
            "2023-02-15,Arusha,Arusha City,Arusha Urban,cereals and tubers,Rice,KG,actual,Retail,2600",
            "2023-03-15,Arusha,Arusha City,Arusha Urban,cereals and tubers,Maize,KG,actual,Retail,900",
        ]);

        let data = load_history(f.path()).unwrap();
        assert_eq!(data.rows_used, 3);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.catalog.regions, vec!["Arusha", "Mbeya"]);
        assert_eq!(data.catalog.commodities, vec!["Maize", "Rice"]);
        assert_eq!(data.stats.price_min, 850.0);
        assert_eq!(data.stats.price_max, 2600.0);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let f = write_csv(&[
            "#date,#adm1+name,#adm2+name,#loc+market+name,#item+type,#item+name,#item+unit,#item+price+flag,#item+price+type,#value",
            "2023-01-15,Mbeya,Mbeya City,Mwanjelwa,cereals and tubers,Maize,KG,actual,Retail,850",
            "not-a-date,Mbeya,Mbeya City,Mwanjelwa,cereals and tubers,Maize,KG,actual,Retail,850",
            "2023-02-15,Mbeya,Mbeya City,Mwanjelwa,cereals and tubers,Maize,KG,actual,Retail,oops",
        ]);

        let data = load_history(f.path()).unwrap();
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 3);
    }

    #[test]
    fn all_rows_malformed_is_no_data() {
        let f = write_csv(&["bad,row,with,too,few,fields"]);
        let err = load_history(f.path()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "date,admin1,market,price").unwrap();
        writeln!(f, "2023-01-15,Mbeya,Mwanjelwa,850").unwrap();

        let err = load_history(f.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("admin2"));
    }

    #[test]
    fn headers_match_case_insensitively() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "Date,Admin1,Admin2,Market,Category,Commodity,Unit,PriceFlag,PriceType,Price"
        )
        .unwrap();
        writeln!(
            f,
            "2023-01-15,Mbeya,Mbeya City,Mwanjelwa,cereals and tubers,Maize,KG,actual,Retail,850"
        )
        .unwrap();

        let data = load_history(f.path()).unwrap();
        assert_eq!(data.rows_used, 1);
    }

    #[test]
    fn trend_filter_matches_all_three_fields_sorted_ascending() {
        let f = write_csv(&[
            "2023-03-15,Arusha,Arusha City,Arusha Urban,cereals and tubers,Maize,KG,actual,Retail,900",
            "2023-01-15,Arusha,Arusha City,Arusha Urban,cereals and tubers,Maize,KG,actual,Retail,850",
            "2023-02-15,Arusha,Arusha City,Kariakoo,cereals and tubers,Maize,KG,actual,Retail,870",
            "2023-02-15,Arusha,Arusha City,Arusha Urban,cereals and tubers,Rice,KG,actual,Retail,2600",
        ]);
        let data = load_history(f.path()).unwrap();

        let trend = filter_trend(&data.records, "Maize", "Arusha", "Arusha Urban");
        assert_eq!(trend.len(), 2);
        assert!(trend[0].date < trend[1].date);
        assert_eq!(trend[0].price, 850.0);
    }

    #[test]
    fn unmatched_trend_filter_is_empty_never_an_error() {
        let f = write_csv(&[
            "2023-01-15,Arusha,Arusha City,Arusha Urban,cereals and tubers,Maize,KG,actual,Retail,850",
        ]);
        let data = load_history(f.path()).unwrap();

        let trend = filter_trend(&data.records, "Maize", "Dodoma", "Arusha Urban");
        assert!(trend.is_empty());
    }
}
