//! Application startup and server initialization.
//!
//! Builds the metrics registry and the canary recorder, publishes the info
//! metric and serves the scrape endpoint.

use std::sync::Arc;

use prometheus::Registry;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::metrics::{CanaryRecorder, Recorder, RecorderError};
use crate::routes;
use crate::state::AppState;

/// Creates a registry, registers the recorder in it and sets the info metric.
///
/// # Errors
///
/// Returns an error if the recorder cannot be built or registered.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, RecorderError> {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::new(&config.controller, Some(registry.as_ref()))?;
    recorder.set_info(env!("CARGO_PKG_VERSION"), &config.mesh_provider);

    Ok(AppState {
        config,
        recorder,
        registry,
    })
}

/// Initializes and runs the metrics server.
///
/// # Errors
///
/// Returns an error if the recorder fails to register, the server fails to
/// bind to the configured address or encounters a runtime error.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone())?;

    info!(
        controller = %config.controller,
        mesh_provider = %config.mesh_provider,
        "Starting metrics server on {}",
        config.bind_address
    );

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
