//! Domain types handed to the recorder by the orchestrator.

pub mod canary;

pub use canary::{Canary, CanaryPhase, TargetRef, WebhookStatus};
