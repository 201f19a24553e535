//! Inference Engine Implementation

use crate::forest::{ForestClassifier, ForestConfig, ForestRegressor};
use crate::InferenceError;
use feature_store::{FeatureTable, FAILURE_LABEL_COLUMN, REMAINING_MINUTES_COLUMN};
use ndarray::Array2;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Output of one inference call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of failure (0.0 to 1.0)
    pub failure_probability: f64,
    /// Predicted remaining useful life in minutes; may be negative
    pub remaining_minutes: f64,
}

impl PredictionResult {
    /// Failure probability as a percentage with two decimals, e.g. `12.50%`
    pub fn failure_percent_label(&self) -> String {
        format!("{:.2}%", self.failure_probability * 100.0)
    }

    /// Remaining useful life truncated to whole minutes
    pub fn remaining_minutes_whole(&self) -> i64 {
        self.remaining_minutes.trunc() as i64
    }
}

/// Prediction for one machine row, with the size of that machine's subset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachinePrediction {
    pub prediction: PredictionResult,
    /// Rows recorded for the machine; valid indices are `0..rows_available`
    pub rows_available: usize,
}

/// Classifier and regressor fitted on the same full table
pub struct TrainedModelPair {
    classifier: ForestClassifier,
    regressor: ForestRegressor,
    feature_names: Vec<String>,
    trained_rows: usize,
}

impl TrainedModelPair {
    /// Fit both models on every row of the table
    pub fn train(table: &FeatureTable, config: &ForestConfig) -> Result<Self, InferenceError> {
        let start = Instant::now();
        let x = table.feature_matrix();
        let labels = table.column(FAILURE_LABEL_COLUMN)?;
        let targets = table.column(REMAINING_MINUTES_COLUMN)?;
        let feature_names = table.feature_names();

        info!(
            rows = table.len(),
            features = feature_names.len(),
            trees = config.n_trees,
            "Training failure classifier and RUL regressor"
        );

        let classifier = ForestClassifier::fit(&x, labels, config)?;
        let regressor = ForestRegressor::fit(&x, targets, config)?;

        let elapsed = start.elapsed();
        metrics::histogram!("model_training_seconds").record(elapsed.as_secs_f64());
        info!("Models trained in {}ms", elapsed.as_millis());

        Ok(Self {
            classifier,
            regressor,
            feature_names,
            trained_rows: table.len(),
        })
    }

    /// Predict from one row of feature values in training column order
    pub fn predict(&self, features: &[f64]) -> Result<PredictionResult, InferenceError> {
        if features.len() != self.feature_names.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} features", self.feature_names.len()),
                actual: format!("{} features", features.len()),
            });
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFiniteInput("prediction row".to_string()));
        }

        let x = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let failure_probability = self.classifier.predict_proba(&x)?[0];
        let remaining_minutes = self.regressor.predict(&x)?[0];

        Ok(PredictionResult {
            failure_probability,
            remaining_minutes,
        })
    }

    /// Feature columns the models were trained on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of rows used for training
    pub fn trained_rows(&self) -> usize {
        self.trained_rows
    }
}

/// Lifecycle of the cached models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    Untrained,
    Trained,
}

/// Trains the model pair on first use and serves predictions from it for the
/// rest of the process.
pub struct InferenceEngine {
    config: ForestConfig,
    models: OnceCell<Arc<TrainedModelPair>>,
}

impl InferenceEngine {
    /// Create an untrained engine
    pub fn new(config: ForestConfig) -> Self {
        info!("Creating inference engine: {:?}", config);
        Self {
            config,
            models: OnceCell::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ModelState {
        if self.models.get().is_some() {
            ModelState::Trained
        } else {
            ModelState::Untrained
        }
    }

    /// Models for the table, training them on the first call. Later calls
    /// return the cached pair even if a different table is passed.
    pub fn models(&self, table: &FeatureTable) -> Result<Arc<TrainedModelPair>, InferenceError> {
        self.models
            .get_or_try_init(|| TrainedModelPair::train(table, &self.config).map(Arc::new))
            .map(Arc::clone)
    }

    /// Predict for row `row` of the given machine's subset of `table`
    pub fn predict(
        &self,
        table: &FeatureTable,
        machine_id: &str,
        row: usize,
    ) -> Result<MachinePrediction, InferenceError> {
        let (index, rows_available) = table.machine_row_index(machine_id, row)?;
        let features = table.feature_row(index)?;

        let models = self.models(table)?;
        let feature_names = table.feature_names();
        if feature_names != models.feature_names() {
            return Err(InferenceError::InvalidInputShape {
                expected: models.feature_names().join(","),
                actual: feature_names.join(","),
            });
        }

        let prediction = models.predict(&features)?;
        debug!(
            "Prediction for {}[{}]: p={:.3}, rul={:.1}",
            machine_id, row, prediction.failure_probability, prediction.remaining_minutes
        );
        Ok(MachinePrediction {
            prediction,
            rows_available,
        })
    }

    /// Ensemble configuration
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}
