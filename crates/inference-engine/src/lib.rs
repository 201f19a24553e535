//! Failure and Remaining-Useful-Life Inference
//!
//! Random forest ensembles fitted once per process on the full feature
//! table, serving point predictions for single rows.

mod engine;
mod forest;

pub use engine::{InferenceEngine, MachinePrediction, ModelState, PredictionResult, TrainedModelPair};
pub use forest::{ForestClassifier, ForestConfig, ForestRegressor};

use feature_store::FeatureStoreError;
use thiserror::Error;

/// Errors during training or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Store(#[from] FeatureStoreError),
    #[error("Training set is empty")]
    EmptyTrainingSet,
    #[error("Training set has no feature columns")]
    NoFeatures,
    #[error("Non-finite value in {0}")]
    NonFiniteInput(String),
    #[error("Failure label must be 0 or 1, got {0}")]
    InvalidLabel(f64),
    #[error("Model training failed: {0}")]
    TrainingFailed(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}
