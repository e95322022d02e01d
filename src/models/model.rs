//! Scaler transform and price model evaluation.
//!
//! The predictor is a pure function of its inputs: scale the aligned feature
//! vector, take the dot product with the model weights, add the intercept.
//! Dimensionality disagreements are contract violations and fail loudly —
//! never truncated, never padded.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::FeatureVector;

/// Typed failures of the scale→predict path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    #[error("feature vector has {got} columns, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Affine standardizing transform fitted at training time.
///
/// `scale` entries of 0 belong to columns that were constant during training;
/// they act as divisor 1 so the transform stays finite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Standardize an aligned feature vector.
    pub fn transform(&self, features: &FeatureVector) -> Result<DVector<f64>, PredictError> {
        if features.len() != self.len() {
            return Err(PredictError::DimensionMismatch {
                expected: self.len(),
                got: features.len(),
            });
        }

        let scaled = features
            .as_slice()
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&m, &s))| {
                let divisor = if s == 0.0 || !s.is_finite() { 1.0 } else { s };
                (x - m) / divisor
            })
            .collect::<Vec<f64>>();

        Ok(DVector::from_vec(scaled))
    }
}

/// Linear-in-features price model: intercept plus per-column weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceModel {
    /// Identifies the tool that wrote the artifact.
    pub tool: String,
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl PriceModel {
    /// Evaluate the model on an already-scaled vector.
    pub fn predict(&self, scaled: &DVector<f64>) -> Result<f64, PredictError> {
        if scaled.len() != self.weights.len() {
            return Err(PredictError::DimensionMismatch {
                expected: self.weights.len(),
                got: scaled.len(),
            });
        }
        let w = DVector::from_column_slice(&self.weights);
        Ok(self.intercept + w.dot(scaled))
    }
}

/// Scale then evaluate: the full predictor contract.
pub fn predict_price(
    model: &PriceModel,
    scaler: &Scaler,
    features: &FeatureVector,
) -> Result<f64, PredictError> {
    let scaled = scaler.transform(features)?;
    model.predict(&scaled)
}
