//! Metrics exposition endpoint.

use crate::metrics::render;
use crate::state::AppState;
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, response::Response, routing::get,
    Router,
};
use serde_json::json;
use tracing::error;

/// Content type of the Prometheus text exposition format.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Creates the metrics route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Handler for the /metrics endpoint.
///
/// Returns every metric in the shared registry in Prometheus text format.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match render(&state.registry) {
        Ok(metrics_text) => (
            StatusCode::OK,
            [("Content-Type", TEXT_FORMAT)],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", "application/json")],
                json!({ "error": format!("failed to encode metrics: {}", e) }).to_string(),
            )
                .into_response()
        }
    }
}
