//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the reference store and the historical dataset
//! - runs the prediction pipeline
//! - prints reports/tables
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{Command, FetchArgs, HistoryArgs, PredictArgs, SampleArgs};
use crate::data::{filter_trend, load_history};
use crate::data::history::{HistoryData, first_option};
use crate::domain::{Catalog, Field, MarketSelection, PredictRequest};
use crate::error::AppError;
use crate::store::{HISTORY_FILE, ReferenceStore, resolve_assets_dir};

pub mod pipeline;

/// Entry point for the `mpp` binary.
pub fn run() -> Result<(), AppError> {
    // We want `mpp` and `mpp --assets DIR` to behave like `mpp tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Predict(args) => {
            init_tracing();
            handle_predict(args)
        }
        Command::History(args) => {
            init_tracing();
            handle_history(args)
        }
        Command::Tui(args) => crate::tui::run(args),
        Command::Sample(args) => {
            init_tracing();
            handle_sample(args)
        }
        Command::Fetch(args) => {
            init_tracing();
            handle_fetch(args)
        }
    }
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let assets = resolve_assets_dir(args.assets.as_deref());
    let store = ReferenceStore::load(&assets)?;
    let data = load_dataset(&assets)?;

    let selection = selection_from_args(&data.catalog, &args);
    let req = PredictRequest {
        selection,
        year: args.year,
        month: args.month,
        day: args.day,
    };

    let output = pipeline::run_predict(&store, &data.records, &req)?;

    println!("{}", crate::report::format_run_summary(&output, &data));
    println!("{}", crate::report::format_history_table(&output.history, 20));

    if let Some(path) = &args.export {
        crate::io::export::write_history_csv(path, &output.history, Some(output.price))?;
    }

    Ok(())
}

fn handle_history(args: HistoryArgs) -> Result<(), AppError> {
    let assets = resolve_assets_dir(args.assets.as_deref());
    let data = load_dataset(&assets)?;

    let commodity = resolve_field(&data.catalog, Field::Commodity, args.commodity.as_deref());
    let region = resolve_field(&data.catalog, Field::Region, args.region.as_deref());
    let market = resolve_field(&data.catalog, Field::Market, args.market.as_deref());

    let trend = filter_trend(&data.records, &commodity, &region, &market);

    println!("=== mpp - Historical Prices for {commodity} in {market}, {region} ===");
    println!("{}", crate::report::format_history_table(&trend, args.limit));

    if let Some(path) = &args.export {
        crate::io::export::write_history_csv(path, &trend, None)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let dir = args
        .dir
        .unwrap_or_else(|| resolve_assets_dir(None));

    let spec = crate::data::SampleSpec {
        seed: args.seed,
        start_year: args.start_year,
        years: args.years,
    };
    let assets = crate::data::generate_sample(&spec)?;
    crate::data::write_assets(&dir, &assets)?;

    println!(
        "Wrote {} records and {} feature columns to '{}'.",
        assets.records.len(),
        assets.columns.len(),
        dir.display()
    );
    Ok(())
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let out = args
        .out
        .unwrap_or_else(|| resolve_assets_dir(args.assets.as_deref()).join(HISTORY_FILE));

    let bytes = crate::data::fetch::fetch_dataset(&args.url, &out)?;
    println!("Wrote {bytes} bytes to '{}'.", out.display());
    Ok(())
}

fn load_dataset(assets: &Path) -> Result<HistoryData, AppError> {
    let data = load_history(&assets.join(HISTORY_FILE))?;
    if !data.row_errors.is_empty() {
        tracing::warn!(
            skipped = data.row_errors.len(),
            used = data.rows_used,
            "skipped malformed dataset rows"
        );
    }
    Ok(data)
}

/// Resolve the eight categorical fields against the catalog: explicit values
/// pass through (with a warning when never observed), unset fields default to
/// the first catalog option, matching how the selector widgets initialize.
pub fn selection_from_args(catalog: &Catalog, args: &PredictArgs) -> MarketSelection {
    MarketSelection {
        region: resolve_field(catalog, Field::Region, args.region.as_deref()),
        district: resolve_field(catalog, Field::District, args.district.as_deref()),
        market: resolve_field(catalog, Field::Market, args.market.as_deref()),
        category: resolve_field(catalog, Field::Category, args.category.as_deref()),
        commodity: resolve_field(catalog, Field::Commodity, args.commodity.as_deref()),
        unit: resolve_field(catalog, Field::Unit, args.unit.as_deref()),
        priceflag: resolve_field(catalog, Field::PriceFlag, args.priceflag.as_deref()),
        pricetype: resolve_field(catalog, Field::PriceType, args.pricetype.as_deref()),
    }
}

fn resolve_field(catalog: &Catalog, field: Field, provided: Option<&str>) -> String {
    match provided {
        Some(value) => {
            if !catalog.contains(field, value) {
                // Encoding drops unseen levels silently; the warning is the
                // only signal the user gets.
                tracing::warn!(
                    field = field.display_name(),
                    value,
                    "value was never observed in the dataset; its feature columns will be zero"
                );
            }
            value.to_string()
        }
        None => first_option(catalog, field).unwrap_or_default().to_string(),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Rewrite argv so `mpp` defaults to `mpp tui`.
///
/// Rules:
/// - `mpp`                      -> `mpp tui`
/// - `mpp --assets DIR ...`     -> `mpp tui --assets DIR ...`
/// - `mpp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "predict" | "history" | "tui" | "sample" | "fetch"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_becomes_tui() {
        assert_eq!(rewrite_args(argv(&["mpp"])), argv(&["mpp", "tui"]));
    }

    #[test]
    fn leading_flag_becomes_tui_flag() {
        assert_eq!(
            rewrite_args(argv(&["mpp", "--assets", "dir"])),
            argv(&["mpp", "tui", "--assets", "dir"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["mpp", "predict"])),
            argv(&["mpp", "predict"])
        );
        assert_eq!(
            rewrite_args(argv(&["mpp", "--help"])),
            argv(&["mpp", "--help"])
        );
    }

    #[test]
    fn unknown_catalog_values_pass_through_for_encoding() {
        let catalog = Catalog {
            regions: vec!["Arusha".to_string()],
            districts: vec!["Arusha City".to_string()],
            markets: vec!["Arusha Urban".to_string()],
            categories: vec!["cereals and tubers".to_string()],
            commodities: vec!["Maize".to_string()],
            units: vec!["KG".to_string()],
            priceflags: vec!["actual".to_string()],
            pricetypes: vec!["Retail".to_string()],
        };

        assert_eq!(
            resolve_field(&catalog, Field::Commodity, Some("Sorghum")),
            "Sorghum"
        );
        assert_eq!(resolve_field(&catalog, Field::Commodity, None), "Maize");
    }
}
