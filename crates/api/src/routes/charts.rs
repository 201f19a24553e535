//! Chart Routes

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::{ApiError, AppState};

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

/// Failure-by-mode bar chart
pub async fn failures_svg(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let table = state.table().await?;
    let breakdown = table.failure_breakdown()?;
    let svg = charts::failure_chart_svg(&breakdown, &state.config.chart)?;
    Ok(svg_response(svg))
}

/// RUL histogram with density curve
pub async fn distribution_svg(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let table = state.table().await?;
    let distribution = table.rul_distribution(state.config.histogram_bins)?;
    let svg = charts::rul_distribution_svg(&distribution, &state.config.chart)?;
    Ok(svg_response(svg))
}
