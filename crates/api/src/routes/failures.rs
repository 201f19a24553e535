//! Failure and Distribution Routes
//!
//! Both views cover the whole table; a `machine` parameter is ignored.

use axum::{extract::State, Json};
use feature_store::{FailureBreakdown, RulDistribution};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Failure counts per operating mode, ascending
pub async fn get_failures(State(state): State<Arc<AppState>>) -> Result<Json<FailureBreakdown>, ApiError> {
    let table = state.table().await?;
    Ok(Json(table.failure_breakdown()?))
}

/// Histogram of remaining useful life
pub async fn get_distribution(State(state): State<Arc<AppState>>) -> Result<Json<RulDistribution>, ApiError> {
    let table = state.table().await?;
    Ok(Json(table.rul_distribution(state.config.histogram_bins)?))
}
