//! Shared application state.
//!
//! Contains the state that is shared across all request handlers.

use crate::config::ConfigV1;
use crate::metrics::Recorder;
use prometheus::Registry;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Canary metrics recorder registered in `registry`.
    pub recorder: Recorder,
    /// Registry rendered by the metrics endpoint.
    pub registry: Arc<Registry>,
}
