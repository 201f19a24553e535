//! Predictive Maintenance Dashboard Server
//!
//! HTTP API and embedded single-page dashboard over the processed equipment
//! feature table: summary statistics per machine, failure counts by
//! operating mode, the remaining-useful-life distribution and on-demand
//! predictions from lazily trained models.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use feature_store::{FeatureStore, FeatureTable};
use inference_engine::{InferenceEngine, ModelState};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
mod error;
mod routes;
mod ui;

pub use crate::config::DashboardConfig;
pub use crate::error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Feature table, read on first request
    pub store: FeatureStore,
    /// Models, trained on first prediction
    pub engine: InferenceEngine,
    pub config: DashboardConfig,
    /// Prometheus recorder handle, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_store(FeatureStore::new(config.store.clone()), config)
    }

    /// State around an existing store
    pub fn with_store(store: FeatureStore, config: DashboardConfig) -> Self {
        Self {
            store,
            engine: InferenceEngine::new(config.forest.clone()),
            config,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// The feature table, reading the file on a blocking thread the first time
    pub async fn table(self: &Arc<Self>) -> Result<Arc<FeatureTable>, ApiError> {
        if self.store.is_loaded() {
            return Ok(self.store.load()?);
        }
        let state = Arc::clone(self);
        Ok(tokio::task::spawn_blocking(move || state.store.load()).await??)
    }
}

/// Requested machine, or the first machine id in file order
pub(crate) fn resolve_machine(table: &FeatureTable, requested: Option<String>) -> Result<String, ApiError> {
    match requested {
        Some(machine) => Ok(machine),
        None => {
            let ids = table.machine_ids()?;
            ids.first()
                .map(|id| id.to_string())
                .ok_or_else(|| ApiError::Store(feature_store::FeatureStoreError::UnknownMachine(String::new())))
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub data_path: String,
    /// Rows in the feature table, once it has been read
    pub table_rows: Option<usize>,
    pub model_state: ModelState,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/machines", get(routes::summary::get_machines))
        .route("/api/v1/summary", get(routes::summary::get_summary))
        .route("/api/v1/failures", get(routes::failures::get_failures))
        .route("/api/v1/distribution", get(routes::failures::get_distribution))
        .route("/api/v1/charts/failures.svg", get(routes::charts::failures_svg))
        .route("/api/v1/charts/distribution.svg", get(routes::charts::distribution_svg))
        .route("/api/v1/predict", get(routes::predict::get_prediction))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let table_rows = if state.store.is_loaded() {
        state.store.load().ok().map(|table| table.len())
    } else {
        None
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        data_path: state.store.data_path().display().to_string(),
        table_rows,
        model_state: state.engine.state(),
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            "metrics recorder not installed\n".to_string(),
        ),
    }
}

/// Initialize logging; `RUST_LOG` overrides the default `info` level
pub fn init_logging() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

/// Run the server until the listener fails
pub async fn run_server(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = state.config.bind_address.clone();
    let app = create_router(state);

    info!("Starting dashboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
