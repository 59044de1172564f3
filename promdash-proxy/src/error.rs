use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Why a single upstream call failed. Callers never see this detail; it only reaches the logs.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("query parameter is missing or empty")]
    MissingQuery,

    #[error("Prometheus query failed: {0}")]
    Prometheus(#[source] UpstreamError),

    #[error("Alertmanager request failed: {0}")]
    Alertmanager(#[source] UpstreamError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingQuery => StatusCode::BAD_REQUEST,
            ApiError::Prometheus(_) | ApiError::Alertmanager(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Fixed client-facing text; the cause stays server-side.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::MissingQuery => "Query parameter is required",
            ApiError::Prometheus(_) => "Failed to fetch data from Prometheus",
            ApiError::Alertmanager(_) => "Failed to fetch data from Alertmanager",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Rejected request");
        }
        (status, self.public_message()).into_response()
    }
}
