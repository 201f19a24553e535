//! Machine and Summary Routes

use axum::{
    extract::{Query, State},
    Json,
};
use feature_store::DescribeTable;
use serde::Serialize;
use std::sync::Arc;

use super::MachineQuery;
use crate::{resolve_machine, ApiError, AppState};

/// Response for machines endpoint
#[derive(Debug, Serialize)]
pub struct MachinesResponse {
    /// Distinct machine ids in order of first appearance
    pub machines: Vec<String>,
    /// Selection used when a request omits `machine`
    pub default: Option<String>,
}

/// Response for summary endpoint
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub machine: String,
    pub rows: usize,
    pub statistics: DescribeTable,
}

/// List machine ids
pub async fn get_machines(State(state): State<Arc<AppState>>) -> Result<Json<MachinesResponse>, ApiError> {
    let table = state.table().await?;
    let machines: Vec<String> = table.machine_ids()?.into_iter().map(String::from).collect();

    Ok(Json(MachinesResponse {
        default: machines.first().cloned(),
        machines,
    }))
}

/// Descriptive statistics for one machine's rows
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MachineQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let table = state.table().await?;
    let machine = resolve_machine(&table, params.machine)?;
    let subset = table.filter_machine(&machine)?;

    Ok(Json(SummaryResponse {
        rows: subset.len(),
        statistics: subset.describe(),
        machine,
    }))
}
