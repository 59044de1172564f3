pub use crate::alertmanager::alerts_handler;
pub use crate::prometheus::query_handler;

use crate::logging::log_requests;
use crate::state::AppState;
use axum::{
    http::StatusCode,
    middleware,
    routing::{get, get_service},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeFile;
use tracing::error;

/// Builds the full HTTP surface: the dashboard page plus the two JSON endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let dashboard = get_service(ServeFile::new(&state.index_file)).handle_error(
        |err: std::io::Error| async move {
            error!("Failed to serve dashboard: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to serve dashboard")
        },
    );

    Router::new()
        .route("/", dashboard)
        .route("/api/query", get(query_handler))
        .route("/api/alerts", get(alerts_handler))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}
