//! Command-line parsing for the market price prediction demo.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the encoding/prediction code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::fetch::DEFAULT_DATASET_URL;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mpp", version, about = "Market Food Price Prediction Explorer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict a price for a market selection and date, print the summary and
    /// trend table, and optionally export the filtered history.
    Predict(PredictArgs),
    /// Print the historical trend for a (commodity, region, market) triple.
    History(HistoryArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `mpp predict`, but renders
    /// the selectors and the trend chart in a terminal UI using Ratatui.
    Tui(PredictArgs),
    /// Write a deterministic synthetic assets bundle (dataset + artifacts).
    Sample(SampleArgs),
    /// Download a food-prices CSV export into the assets directory.
    Fetch(FetchArgs),
}

/// Common options for predicting (also the TUI's initial state).
///
/// Categorical options left unset default to the first catalog value for
/// that field, mirroring how the selector widgets initialize.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Assets directory (defaults to $MPP_ASSETS_DIR, then ./assets).
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Region (admin1).
    #[arg(long)]
    pub region: Option<String>,

    /// District (admin2).
    #[arg(long)]
    pub district: Option<String>,

    /// Market name.
    #[arg(long)]
    pub market: Option<String>,

    /// Commodity category.
    #[arg(long)]
    pub category: Option<String>,

    /// Commodity.
    #[arg(long)]
    pub commodity: Option<String>,

    /// Unit of sale.
    #[arg(long)]
    pub unit: Option<String>,

    /// Price flag (e.g. actual, aggregate).
    #[arg(long)]
    pub priceflag: Option<String>,

    /// Price type (e.g. Retail, Wholesale).
    #[arg(long)]
    pub pricetype: Option<String>,

    /// Prediction year.
    #[arg(long, default_value_t = 2024, value_parser = clap::value_parser!(i32).range(2000..=2050))]
    pub year: i32,

    /// Prediction month.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    /// Prediction day.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: u32,

    /// Export the filtered history (with the predicted price) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for the history table.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Assets directory (defaults to $MPP_ASSETS_DIR, then ./assets).
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Commodity.
    #[arg(long)]
    pub commodity: Option<String>,

    /// Region (admin1).
    #[arg(long)]
    pub region: Option<String>,

    /// Market name.
    #[arg(long)]
    pub market: Option<String>,

    /// Show at most this many of the latest rows.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Export the filtered history to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for synthetic asset generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Directory to write the bundle into (defaults to the assets directory).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Random seed for the generated series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First year of the generated series.
    #[arg(long, default_value_t = 2018, value_parser = clap::value_parser!(i32).range(2000..=2045))]
    pub start_year: i32,

    /// Number of years to generate.
    #[arg(long, default_value_t = 6)]
    pub years: u32,
}

/// Options for the dataset download helper.
#[derive(Debug, Parser)]
pub struct FetchArgs {
    /// Source URL for the CSV export.
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    pub url: String,

    /// Output path (defaults to `prices.csv` in the assets directory).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Assets directory used when `--out` is not given.
    #[arg(long)]
    pub assets: Option<PathBuf>,
}
