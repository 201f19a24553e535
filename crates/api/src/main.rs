//! Predictive Maintenance Dashboard - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppState, DashboardConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to install tracing subscriber")?;

    info!("=== Predictive Maintenance Dashboard v{} ===", env!("CARGO_PKG_VERSION"));

    let config = DashboardConfig::load().context("failed to load dashboard configuration")?;
    info!("Reading features from {}", config.store.data_path.display());

    let mut state = AppState::new(config);
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Metrics exporter disabled: {}", e),
    }

    run_server(Arc::new(state)).await?;

    Ok(())
}
