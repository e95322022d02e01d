//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during encoding and prediction
//! - exported to JSON/CSV
//! - reloaded later for charting or comparisons

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The eight categorical input fields.
///
/// Each field maps to a dataset column (`column_name`) and a human label
/// (`display_name`). One-hot feature columns are named `column_value`, so the
/// dataset column name is also the encoding prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Region,
    District,
    Market,
    Category,
    Commodity,
    Unit,
    PriceFlag,
    PriceType,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Region,
        Field::District,
        Field::Market,
        Field::Category,
        Field::Commodity,
        Field::Unit,
        Field::PriceFlag,
        Field::PriceType,
    ];

    /// Dataset column name (WFP export convention: regions are `admin1`,
    /// districts are `admin2`).
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Region => "admin1",
            Field::District => "admin2",
            Field::Market => "market",
            Field::Category => "category",
            Field::Commodity => "commodity",
            Field::Unit => "unit",
            Field::PriceFlag => "priceflag",
            Field::PriceType => "pricetype",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Region => "Region",
            Field::District => "District",
            Field::Market => "Market",
            Field::Category => "Category",
            Field::Commodity => "Commodity",
            Field::Unit => "Unit",
            Field::PriceFlag => "Price flag",
            Field::PriceType => "Price type",
        }
    }
}

/// One full set of categorical selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSelection {
    pub region: String,
    pub district: String,
    pub market: String,
    pub category: String,
    pub commodity: String,
    pub unit: String,
    pub priceflag: String,
    pub pricetype: String,
}

impl MarketSelection {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Region => &self.region,
            Field::District => &self.district,
            Field::Market => &self.market,
            Field::Category => &self.category,
            Field::Commodity => &self.commodity,
            Field::Unit => &self.unit,
            Field::PriceFlag => &self.priceflag,
            Field::PriceType => &self.pricetype,
        }
    }
}

/// A raw input record, ready for encoding.
///
/// `week` is derived from the calendar fields (ISO week number, defaulting to
/// 1 when the date triple is invalid — see `dates::week_or_default`).
#[derive(Debug, Clone)]
pub struct RawInput {
    pub selection: MarketSelection,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub week: u32,
}

impl RawInput {
    /// Categorical (encoding prefix, selected value) pairs in field order.
    pub fn categorical_fields(&self) -> [(&'static str, &str); 8] {
        [
            (Field::Region.column_name(), self.selection.value(Field::Region)),
            (Field::District.column_name(), self.selection.value(Field::District)),
            (Field::Market.column_name(), self.selection.value(Field::Market)),
            (Field::Category.column_name(), self.selection.value(Field::Category)),
            (Field::Commodity.column_name(), self.selection.value(Field::Commodity)),
            (Field::Unit.column_name(), self.selection.value(Field::Unit)),
            (Field::PriceFlag.column_name(), self.selection.value(Field::PriceFlag)),
            (Field::PriceType.column_name(), self.selection.value(Field::PriceType)),
        ]
    }
}

/// The fixed, ordered feature-column list established at training time.
///
/// All runtime inputs are aligned to this list: same length, same order,
/// regardless of which categorical values were selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalColumns {
    names: Vec<String>,
}

impl CanonicalColumns {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// An encoded feature vector aligned to a `CanonicalColumns` list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// One row of the historical price dataset (read-only, used for chart
/// filtering and for building the selector catalogs).
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub region: String,
    pub district: String,
    pub market: String,
    pub category: String,
    pub commodity: String,
    pub unit: String,
    pub priceflag: String,
    pub pricetype: String,
    pub price: f64,
}

/// Distinct, sorted values observed per categorical field.
///
/// Front-ends constrain their selectors to these values, matching how the
/// dataset itself bounds the input space.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub regions: Vec<String>,
    pub districts: Vec<String>,
    pub markets: Vec<String>,
    pub categories: Vec<String>,
    pub commodities: Vec<String>,
    pub units: Vec<String>,
    pub priceflags: Vec<String>,
    pub pricetypes: Vec<String>,
}

impl Catalog {
    pub fn options(&self, field: Field) -> &[String] {
        match field {
            Field::Region => &self.regions,
            Field::District => &self.districts,
            Field::Market => &self.markets,
            Field::Category => &self.categories,
            Field::Commodity => &self.commodities,
            Field::Unit => &self.units,
            Field::PriceFlag => &self.priceflags,
            Field::PriceType => &self.pricetypes,
        }
    }

    pub fn contains(&self, field: Field, value: &str) -> bool {
        self.options(field).iter().any(|v| v == value)
    }
}

/// A prediction request as understood by the pipeline (selection + date).
#[derive(Debug, Clone)]
pub struct PredictRequest {
    pub selection: MarketSelection,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// All computed outputs of a single prediction run.
#[derive(Debug, Clone)]
pub struct PredictOutput {
    pub input: RawInput,
    /// True when the date triple was invalid and week 1 was substituted.
    pub week_fallback: bool,
    pub price: f64,
    /// Historical records matching (commodity, region, market), date-ascending.
    /// Empty means "no data" — the caller surfaces a notice, not an error.
    pub history: Vec<HistoricalRecord>,
}
