use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::codes::PHASE_CODES;

/// The workload a canary rolls out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    #[serde(default)]
    pub kind: String,
    pub name: String,
}

/// The identifying fields of a canary object.
///
/// Only what the recorder needs to build label tuples is kept here: the
/// object's own name, its namespace and the target it promotes. Metric labels
/// always use the target name, not the canary object name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Canary {
    pub name: String,
    pub namespace: String,
    pub target_ref: TargetRef,
}

impl Canary {
    /// Build a canary reference targeting a `Deployment` named `target`.
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Canary {
            name: name.into(),
            namespace: namespace.into(),
            target_ref: TargetRef {
                kind: "Deployment".to_string(),
                name: target.into(),
            },
        }
    }

    /// Name of the rolled-out workload, used as the `name` label.
    pub fn target_name(&self) -> &str {
        &self.target_ref.name
    }

    /// Workload label of the primary variant in `canary_weight`.
    pub fn primary_workload(&self) -> String {
        format!("{}-primary", self.target_ref.name)
    }
}

/// Phase of a canary rollout as reported by the orchestrator.
///
/// Any phase string this crate does not know deserialises to `Unknown`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanaryPhase {
    Initializing,
    Initialized,
    Waiting,
    Progressing,
    WaitingPromotion,
    Promoting,
    Finalising,
    Succeeded,
    Failed,
    Terminating,
    Terminated,
    #[serde(other)]
    Unknown,
}

impl CanaryPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanaryPhase::Initializing => "Initializing",
            CanaryPhase::Initialized => "Initialized",
            CanaryPhase::Waiting => "Waiting",
            CanaryPhase::Progressing => "Progressing",
            CanaryPhase::WaitingPromotion => "WaitingPromotion",
            CanaryPhase::Promoting => "Promoting",
            CanaryPhase::Finalising => "Finalising",
            CanaryPhase::Succeeded => "Succeeded",
            CanaryPhase::Failed => "Failed",
            CanaryPhase::Terminating => "Terminating",
            CanaryPhase::Terminated => "Terminated",
            CanaryPhase::Unknown => "Unknown",
        }
    }
}

impl From<&str> for CanaryPhase {
    fn from(value: &str) -> Self {
        PHASE_CODES
            .iter()
            .copied()
            .find(|phase| phase.as_str() == value)
            .unwrap_or(CanaryPhase::Unknown)
    }
}

impl fmt::Display for CanaryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the last call to a confirmation webhook.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookStatus {
    Success = 0,
    Failed = 1,
}

impl WebhookStatus {
    pub fn value(self) -> f64 {
        self as i32 as f64
    }
}

impl From<bool> for WebhookStatus {
    /// `true` means the webhook approved the step.
    fn from(passed: bool) -> Self {
        if passed {
            WebhookStatus::Success
        } else {
            WebhookStatus::Failed
        }
    }
}
