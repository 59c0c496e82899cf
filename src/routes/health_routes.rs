//! Liveness endpoint.

use crate::state::AppState;
use axum::{routing::get, Router};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Returns 200 as long as the process serves requests. Recording never
/// blocks, so there is nothing else to probe.
async fn health_check() -> &'static str {
    "OK"
}
