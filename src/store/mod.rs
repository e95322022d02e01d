//! The reference store: trained model, scaler, and canonical column list.
//!
//! All three artifacts are JSON files in the assets directory, written at
//! training time (or by `mpp sample`). They are loaded together once at
//! startup, cross-checked for dimensional consistency, and never mutated for
//! the rest of the process lifetime — front-ends share them read-only.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::CanonicalColumns;
use crate::error::AppError;
use crate::models::{PriceModel, Scaler};

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const COLUMNS_FILE: &str = "columns.json";
pub const HISTORY_FILE: &str = "prices.csv";

/// Environment variable overriding the assets directory (a `.env` file is
/// honored via dotenvy).
pub const ASSETS_ENV: &str = "MPP_ASSETS_DIR";

/// Immutable, process-scoped prediction assets.
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    pub model: PriceModel,
    pub scaler: Scaler,
    pub columns: CanonicalColumns,
}

impl ReferenceStore {
    /// Load and validate the three artifacts from `dir`.
    ///
    /// Any missing, unreadable, or mutually inconsistent artifact is fatal:
    /// the application cannot run without its reference store.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let model: PriceModel = read_json(&dir.join(MODEL_FILE))?;
        let scaler: Scaler = read_json(&dir.join(SCALER_FILE))?;
        let columns: CanonicalColumns = read_json(&dir.join(COLUMNS_FILE))?;

        if columns.is_empty() {
            return Err(AppError::input(format!(
                "Canonical column list in '{}' is empty.",
                dir.join(COLUMNS_FILE).display()
            )));
        }
        if scaler.mean.len() != scaler.scale.len() {
            return Err(AppError::input(format!(
                "Scaler mean/scale lengths disagree ({} vs {}).",
                scaler.mean.len(),
                scaler.scale.len()
            )));
        }
        if scaler.len() != columns.len() || model.weights.len() != columns.len() {
            return Err(AppError::input(format!(
                "Artifact dimensions disagree: {} columns, scaler {}, model {} weights.",
                columns.len(),
                scaler.len(),
                model.weights.len()
            )));
        }
        if !model.intercept.is_finite()
            || model.weights.iter().any(|w| !w.is_finite())
            || scaler.mean.iter().any(|m| !m.is_finite())
        {
            return Err(AppError::input("Artifacts contain non-finite parameters."));
        }

        Ok(Self {
            model,
            scaler,
            columns,
        })
    }
}

/// Resolve the assets directory: explicit flag, then `MPP_ASSETS_DIR`, then
/// `./assets`.
pub fn resolve_assets_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    dotenvy::dotenv().ok();
    if let Ok(dir) = std::env::var(ASSETS_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from("assets")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid JSON in '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, json: &str) {
        std::fs::write(dir.join(name), json).unwrap();
    }

    fn write_valid(dir: &Path) {
        write(
            dir,
            MODEL_FILE,
            r#"{"tool":"mpp","intercept":100.0,"weights":[1.0,2.0,3.0]}"#,
        );
        write(
            dir,
            SCALER_FILE,
            r#"{"mean":[0.0,0.0,0.0],"scale":[1.0,1.0,1.0]}"#,
        );
        write(dir, COLUMNS_FILE, r#"["year","month","commodity_Maize"]"#);
    }

    #[test]
    fn loads_consistent_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        write_valid(tmp.path());

        let store = ReferenceStore::load(tmp.path()).unwrap();
        assert_eq!(store.columns.len(), 3);
        assert_eq!(store.model.weights.len(), 3);
        assert_eq!(store.scaler.len(), 3);
    }

    #[test]
    fn missing_artifact_is_fatal_with_input_exit_code() {
        let tmp = tempfile::tempdir().unwrap();
        write_valid(tmp.path());
        std::fs::remove_file(tmp.path().join(SCALER_FILE)).unwrap();

        let err = ReferenceStore::load(tmp.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn dimension_disagreement_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_valid(tmp.path());
        write(tmp.path(), COLUMNS_FILE, r#"["year","month"]"#);

        let err = ReferenceStore::load(tmp.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("dimensions disagree"));
    }

    #[test]
    fn explicit_flag_wins_assets_resolution() {
        let dir = resolve_assets_dir(Some(Path::new("/tmp/custom")));
        assert_eq!(dir, PathBuf::from("/tmp/custom"));
    }
}
