//! Download a food-prices CSV export into the assets directory.

use std::path::Path;

use crate::error::AppError;

/// WFP food-prices export for the United Republic of Tanzania (HDX).
pub const DEFAULT_DATASET_URL: &str =
    "https://data.humdata.org/dataset/wfp-food-prices-for-united-republic-of-tanzania/resource/download/wfp_food_prices_tza.csv";

/// Fetch `url` and write the body to `out`. Returns the number of bytes
/// written.
pub fn fetch_dataset(url: &str, out: &Path) -> Result<u64, AppError> {
    let resp = reqwest::blocking::get(url)
        .map_err(|e| AppError::runtime(format!("Dataset request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::runtime(format!(
            "Dataset request failed with status {}.",
            resp.status()
        )));
    }

    let bytes = resp
        .bytes()
        .map_err(|e| AppError::runtime(format!("Failed to read dataset body: {e}")))?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", parent.display())))?;
        }
    }

    std::fs::write(out, &bytes)
        .map_err(|e| AppError::input(format!("Failed to write '{}': {e}", out.display())))?;

    Ok(bytes.len() as u64)
}
