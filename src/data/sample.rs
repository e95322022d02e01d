//! Synthetic demo assets: a historical dataset plus matching artifacts.
//!
//! `mpp sample` writes everything the demo needs to run offline: the price
//! history CSV, the canonical column list, the scaler, and the model. The
//! generator is fully seeded, so the same inputs always produce the same
//! bundle. Scaler and model parameters are derived from group statistics of
//! the generated rows; this is asset synthesis for the demo, not training.

use std::f64::consts::TAU;
use std::fs::File;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::history::build_catalog;
use crate::domain::{CanonicalColumns, Catalog, Field, HistoricalRecord, MarketSelection, RawInput};
use crate::encode::encode;
use crate::error::AppError;
use crate::models::{PriceModel, Scaler};
use crate::store::{COLUMNS_FILE, HISTORY_FILE, MODEL_FILE, SCALER_FILE};

/// (region, district, market) triples for the synthetic markets.
const MARKETS: [(&str, &str, &str); 4] = [
    ("Arusha", "Arusha City", "Arusha Urban"),
    ("Dar es Salaam", "Ilala", "Kariakoo"),
    ("Dodoma", "Dodoma Urban", "Majengo"),
    ("Mbeya", "Mbeya City", "Mwanjelwa"),
];

/// (category, commodity, base retail price per KG in TZS).
const COMMODITIES: [(&str, &str, f64); 5] = [
    ("cereals and tubers", "Maize", 780.0),
    ("cereals and tubers", "Rice", 2450.0),
    ("cereals and tubers", "Potatoes (Irish)", 1050.0),
    ("pulses and nuts", "Beans", 2100.0),
    ("vegetables and fruits", "Tomatoes", 1400.0),
];

/// (pricetype, unit, multiplier on the per-KG base).
const PRICE_TYPES: [(&str, &str, f64); 2] = [
    ("Retail", "KG", 1.0),
    ("Wholesale", "100 KG", 85.0),
];

/// Seasonal swing and year-on-year drift for the synthetic series.
const SEASONAL_AMPLITUDE: f64 = 0.12;
const ANNUAL_DRIFT: f64 = 0.045;
const NOISE_SIGMA: f64 = 0.05;
const AGGREGATE_SHARE: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub seed: u64,
    pub start_year: i32,
    pub years: u32,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            start_year: 2018,
            years: 6,
        }
    }
}

/// A complete generated bundle, kept in memory so tests can use it directly.
#[derive(Debug, Clone)]
pub struct SampleAssets {
    pub records: Vec<HistoricalRecord>,
    pub catalog: Catalog,
    pub columns: CanonicalColumns,
    pub scaler: Scaler,
    pub model: PriceModel,
}

pub fn generate_sample(spec: &SampleSpec) -> Result<SampleAssets, AppError> {
    if spec.years == 0 {
        return Err(AppError::input("Sample span must cover at least one year."));
    }
    if !(2000..=2045).contains(&spec.start_year) {
        return Err(AppError::input("Sample start year must be within [2000, 2045]."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;

    let mut records = Vec::new();
    for month_index in 0..(spec.years * 12) {
        let year = spec.start_year + (month_index / 12) as i32;
        let month = month_index % 12 + 1;
        // Observation day: WFP monthly series cluster mid-month.
        let date = NaiveDate::from_ymd_opt(year, month, 15)
            .ok_or_else(|| AppError::runtime("Generated an invalid observation date."))?;

        let elapsed_years = f64::from(month_index) / 12.0;
        let seasonal = 1.0 + SEASONAL_AMPLITUDE * (TAU * (f64::from(month) - 3.0) / 12.0).sin();
        let drift = (1.0 + ANNUAL_DRIFT).powf(elapsed_years);

        for (region, district, market) in MARKETS {
            for (category, commodity, base) in COMMODITIES {
                for (pricetype, unit, factor) in PRICE_TYPES {
                    let noise = (NOISE_SIGMA * normal.sample(&mut rng)).exp();
                    let price = base * factor * seasonal * drift * noise;

                    let priceflag = if rng.gen_range(0.0..1.0) < AGGREGATE_SHARE {
                        "aggregate"
                    } else {
                        "actual"
                    };

                    records.push(HistoricalRecord {
                        date,
                        region: region.to_string(),
                        district: district.to_string(),
                        market: market.to_string(),
                        category: category.to_string(),
                        commodity: commodity.to_string(),
                        unit: unit.to_string(),
                        priceflag: priceflag.to_string(),
                        pricetype: pricetype.to_string(),
                        price: (price * 100.0).round() / 100.0,
                    });
                }
            }
        }
    }

    let catalog = build_catalog(&records);
    let columns = columns_from_catalog(&catalog);
    let design = encode_records(&records, &columns);
    let scaler = fit_scaler(&design, columns.len());
    let model = derive_model(&records, &design, &scaler, &columns);

    Ok(SampleAssets {
        records,
        catalog,
        columns,
        scaler,
        model,
    })
}

/// Write the bundle into `dir` (created if needed).
pub fn write_assets(dir: &Path, assets: &SampleAssets) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", dir.display())))?;

    crate::io::export::write_history_csv(&dir.join(HISTORY_FILE), &assets.records, None)?;
    write_json(&dir.join(COLUMNS_FILE), &assets.columns)?;
    write_json(&dir.join(SCALER_FILE), &assets.scaler)?;
    write_json(&dir.join(MODEL_FILE), &assets.model)?;
    Ok(())
}

/// Canonical column order: the four numeric fields, then one-hot columns per
/// field in declaration order, levels sorted within each field.
fn columns_from_catalog(catalog: &Catalog) -> CanonicalColumns {
    let mut names: Vec<String> = ["year", "month", "day", "week"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    for field in Field::ALL {
        for value in catalog.options(field) {
            names.push(format!("{}_{}", field.column_name(), value));
        }
    }

    CanonicalColumns::new(names)
}

fn encode_records(records: &[HistoricalRecord], columns: &CanonicalColumns) -> Vec<Vec<f64>> {
    records
        .iter()
        .map(|r| {
            let input = RawInput {
                selection: MarketSelection {
                    region: r.region.clone(),
                    district: r.district.clone(),
                    market: r.market.clone(),
                    category: r.category.clone(),
                    commodity: r.commodity.clone(),
                    unit: r.unit.clone(),
                    priceflag: r.priceflag.clone(),
                    pricetype: r.pricetype.clone(),
                },
                year: r.date.year(),
                month: r.date.month(),
                day: r.date.day(),
                week: r.date.iso_week().week(),
            };
            encode(&input, columns).as_slice().to_vec()
        })
        .collect()
}

/// Per-column mean and population standard deviation of the design matrix.
fn fit_scaler(design: &[Vec<f64>], width: usize) -> Scaler {
    let n = design.len().max(1) as f64;
    let mut mean = vec![0.0; width];
    for row in design {
        for (m, &x) in mean.iter_mut().zip(row.iter()) {
            *m += x;
        }
    }
    for m in mean.iter_mut() {
        *m /= n;
    }

    let mut scale = vec![0.0; width];
    for row in design {
        for ((s, &m), &x) in scale.iter_mut().zip(mean.iter()).zip(row.iter()) {
            *s += (x - m) * (x - m);
        }
    }
    for s in scale.iter_mut() {
        *s = (*s / n).sqrt();
    }

    Scaler { mean, scale }
}

/// Model parameters from group statistics: intercept is the global mean
/// price; each one-hot column's weight is its group-mean deviation, expressed
/// in scaled-feature units. Numeric columns get weight 0.
fn derive_model(
    records: &[HistoricalRecord],
    design: &[Vec<f64>],
    scaler: &Scaler,
    columns: &CanonicalColumns,
) -> PriceModel {
    let n = records.len().max(1) as f64;
    let global_mean = records.iter().map(|r| r.price).sum::<f64>() / n;

    let mut weights = vec![0.0; columns.len()];
    for (j, name) in columns.iter().enumerate() {
        if matches!(name, "year" | "month" | "day" | "week") {
            continue;
        }

        let mut group_sum = 0.0;
        let mut group_n = 0usize;
        for (row, record) in design.iter().zip(records.iter()) {
            if row[j] == 1.0 {
                group_sum += record.price;
                group_n += 1;
            }
        }
        if group_n == 0 {
            continue;
        }
        let group_mean = group_sum / group_n as f64;
        weights[j] = (group_mean - global_mean) * scaler.scale[j];
    }

    PriceModel {
        tool: "mpp".to_string(),
        intercept: global_mean,
        weights,
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::input(format!("Failed to write '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_spec() -> SampleSpec {
        SampleSpec {
            seed: 7,
            start_year: 2020,
            years: 1,
        }
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let a = generate_sample(&small_spec()).unwrap();
        let b = generate_sample(&small_spec()).unwrap();

        assert_eq!(a.records.len(), b.records.len());
        assert_eq!(a.records[0].price, b.records[0].price);
        assert_eq!(a.model.intercept, b.model.intercept);
        assert_eq!(a.model.weights, b.model.weights);
    }

    #[test]
    fn artifact_dimensions_agree() {
        let assets = generate_sample(&small_spec()).unwrap();
        assert_eq!(assets.scaler.len(), assets.columns.len());
        assert_eq!(assets.model.weights.len(), assets.columns.len());
        // 12 months × 4 markets × 5 commodities × 2 price types.
        assert_eq!(assets.records.len(), 12 * 4 * 5 * 2);
    }

    #[test]
    fn catalog_covers_every_generated_level() {
        let assets = generate_sample(&small_spec()).unwrap();
        assert_eq!(assets.catalog.regions.len(), 4);
        assert_eq!(assets.catalog.commodities.len(), 5);
        assert_eq!(assets.catalog.pricetypes, vec!["Retail", "Wholesale"]);
        // Every catalog level has a canonical one-hot column.
        for field in Field::ALL {
            for value in assets.catalog.options(field) {
                let name = format!("{}_{}", field.column_name(), value);
                assert!(assets.columns.position(&name).is_some(), "missing {name}");
            }
        }
    }

    #[test]
    fn written_bundle_round_trips_through_the_loaders() {
        let tmp = tempfile::tempdir().unwrap();
        let assets = generate_sample(&small_spec()).unwrap();
        write_assets(tmp.path(), &assets).unwrap();

        let store = crate::store::ReferenceStore::load(tmp.path()).unwrap();
        assert_eq!(store.columns, assets.columns);

        let data = crate::data::load_history(&tmp.path().join(HISTORY_FILE)).unwrap();
        assert_eq!(data.rows_used, assets.records.len());
        assert!(data.row_errors.is_empty());
    }

    #[test]
    fn zero_year_span_is_rejected() {
        let err = generate_sample(&SampleSpec {
            seed: 1,
            start_year: 2020,
            years: 0,
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
