//! Canary rollout metrics for Prometheus.
//!
//! This module maps canary lifecycle events onto a fixed set of gauges and
//! one histogram, and renders a registry in the text exposition format.

pub mod codes;
mod error;
mod recorder;

pub use codes::{phase_code, CanaryStatus};
pub use error::RecorderError;
pub use recorder::{render, CanaryRecorder, Recorder};
