//! Shared prediction pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! derive week -> encode -> align -> scale -> predict -> filter history
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::filter_trend;
use crate::dates::week_or_default;
use crate::domain::{HistoricalRecord, PredictOutput, PredictRequest, RawInput};
use crate::encode::encode;
use crate::error::AppError;
use crate::models::predict_price;
use crate::store::ReferenceStore;

/// Execute one prediction against the reference store and the (read-only)
/// historical records.
pub fn run_predict(
    store: &ReferenceStore,
    records: &[HistoricalRecord],
    req: &PredictRequest,
) -> Result<PredictOutput, AppError> {
    let (week, week_fallback) = week_or_default(req.year, req.month, req.day);
    if week_fallback {
        tracing::warn!(
            year = req.year,
            month = req.month,
            day = req.day,
            "invalid date entered; defaulting to week 1"
        );
    }

    let input = RawInput {
        selection: req.selection.clone(),
        year: req.year,
        month: req.month,
        day: req.day,
        week,
    };

    let features = encode(&input, &store.columns);
    let price = predict_price(&store.model, &store.scaler, &features)
        .map_err(|e| AppError::runtime(format!("Prediction failed: {e}")))?;
    if !price.is_finite() {
        return Err(AppError::runtime("Non-finite model prediction."));
    }

    let history = filter_trend(
        records,
        &input.selection.commodity,
        &input.selection.region,
        &input.selection.market,
    );

    Ok(PredictOutput {
        input,
        week_fallback,
        price,
        history,
    })
}
