//! Prediction Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use inference_engine::MachinePrediction;

use crate::{resolve_machine, ApiError, AppState};

/// Query parameters for predict endpoint
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// Machine id; the first machine when omitted
    pub machine: Option<String>,
    /// Row index within the machine's rows
    #[serde(default)]
    pub row: usize,
}

/// Response for predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub machine: String,
    pub row: usize,
    /// Rows available for the machine; valid indices are `0..rows_available`
    pub rows_available: usize,
    pub failure_probability: f64,
    /// Probability as a percentage, e.g. `12.50%`
    pub failure_risk: String,
    pub remaining_minutes: f64,
    /// Remaining minutes truncated to an integer
    pub remaining_minutes_whole: i64,
}

/// Predict failure risk and remaining life for one row. The first call
/// trains the models on a blocking thread.
pub async fn get_prediction(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictQuery>,
) -> Result<Json<PredictResponse>, ApiError> {
    let table = state.table().await?;
    let machine = resolve_machine(&table, params.machine)?;
    let row = params.row;

    let MachinePrediction {
        prediction: result,
        rows_available,
    } = {
        let state = Arc::clone(&state);
        let table = Arc::clone(&table);
        let machine = machine.clone();
        tokio::task::spawn_blocking(move || state.engine.predict(&table, &machine, row)).await??
    };

    metrics::counter!("predictions_served_total").increment(1);
    info!(
        "Prediction for {} row {}: risk {}, RUL {}",
        machine,
        row,
        result.failure_percent_label(),
        result.remaining_minutes_whole()
    );

    Ok(Json(PredictResponse {
        machine,
        row,
        rows_available,
        failure_probability: result.failure_probability,
        failure_risk: result.failure_percent_label(),
        remaining_minutes: result.remaining_minutes,
        remaining_minutes_whole: result.remaining_minutes_whole(),
    }))
}
