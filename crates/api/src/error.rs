//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use charts::ChartError;
use feature_store::FeatureStoreError;
use inference_engine::InferenceError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] FeatureStoreError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn store_status(err: &FeatureStoreError) -> StatusCode {
        match err {
            FeatureStoreError::UnknownMachine(_) => StatusCode::NOT_FOUND,
            FeatureStoreError::RowOutOfRange { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(err) | ApiError::Inference(InferenceError::Store(err)) => {
                Self::store_status(err)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unknown = ApiError::Store(FeatureStoreError::UnknownMachine("Z".into()));
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let out_of_range = ApiError::Inference(InferenceError::Store(FeatureStoreError::RowOutOfRange {
            index: 5,
            len: 3,
        }));
        assert_eq!(out_of_range.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::Store(FeatureStoreError::MissingColumn("failure_label".into()));
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let training = ApiError::Inference(InferenceError::EmptyTrainingSet);
        assert_eq!(training.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
