//! Metrics recording implementation using Prometheus.

use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder, DEFAULT_BUCKETS,
};
use tracing::{debug, error, info, warn};

use super::codes::{phase_code, CanaryStatus};
use super::error::RecorderError;
use crate::models::{Canary, CanaryPhase, WebhookStatus};

/// Trait for recording canary rollout metrics.
///
/// Implementations only store what they are handed; deciding when a value
/// changes is up to the orchestrator.
pub trait CanaryRecorder: Clone + Send + Sync + 'static {
    /// Publishes the running version and mesh provider as an info metric.
    fn set_info(&self, version: &str, mesh_provider: &str);

    /// Records the time spent performing one canary analysis.
    fn set_duration(&self, canary: &Canary, elapsed: Duration);

    /// Sets the number of canaries in a namespace.
    fn set_total(&self, namespace: &str, total: usize);

    /// Sets the last known analysis result derived from `phase`.
    fn set_status(&self, canary: &Canary, phase: CanaryPhase);

    /// Sets the outcome of the last confirm-rollout webhook call.
    fn set_webhook_confirm_rollout(&self, canary: &Canary, status: WebhookStatus);

    /// Sets the outcome of the last confirm-traffic-increase webhook call.
    fn set_webhook_confirm_traffic_increase(&self, canary: &Canary, status: WebhookStatus);

    /// Sets the outcome of the last confirm-promotion webhook call.
    fn set_webhook_confirm_promotion(&self, canary: &Canary, status: WebhookStatus);

    /// Sets the current phase code of a canary.
    fn set_phase(&self, canary: &Canary, phase: CanaryPhase);

    /// Sets the primary and canary destination weights.
    fn set_weight(&self, canary: &Canary, primary: i64, canary_weight: i64);

    /// Drops every series labelled with this canary and returns how many existed.
    fn remove_canary(&self, canary: &Canary) -> usize;
}

/// Prometheus recorder for canary analysis.
///
/// Cloning is cheap: the vectors share their series storage.
#[derive(Clone)]
pub struct Recorder {
    info: GaugeVec,
    duration: HistogramVec,
    total: GaugeVec,
    // 0 - running, 1 - successful, 2 - failed
    status: GaugeVec,
    phase: GaugeVec,
    webhook_confirm_rollout: GaugeVec,
    webhook_confirm_traffic_increase: GaugeVec,
    webhook_confirm_promotion: GaugeVec,
    weight: GaugeVec,
}

fn fq_name(controller: &str, name: &str) -> String {
    if controller.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", controller, name)
    }
}

fn gauge_vec(
    controller: &str,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec, RecorderError> {
    GaugeVec::new(Opts::new(name, help).subsystem(controller), labels).map_err(|source| {
        RecorderError::Instrument {
            metric: fq_name(controller, name),
            source,
        }
    })
}

impl Recorder {
    /// Creates the canary instruments under the `controller` subsystem.
    ///
    /// With a registry every instrument is registered in it, and a name that
    /// is already taken fails the whole construction. Without one, nothing
    /// outside the recorder is touched.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Instrument`] if an instrument definition is
    /// invalid and [`RecorderError::Registration`] if registration fails. A
    /// failed registration leaves the registry as it was before the call.
    pub fn new(controller: &str, registry: Option<&Registry>) -> Result<Self, RecorderError> {
        let info = gauge_vec(
            controller,
            "info",
            "Flagger version and mesh provider information",
            &["version", "mesh_provider"],
        )?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "canary_duration_seconds",
                "Seconds spent performing canary analysis.",
            )
            .subsystem(controller)
            .buckets(DEFAULT_BUCKETS.to_vec()),
            &["name", "namespace"],
        )
        .map_err(|source| RecorderError::Instrument {
            metric: fq_name(controller, "canary_duration_seconds"),
            source,
        })?;

        let total = gauge_vec(
            controller,
            "canary_total",
            "Total number of canary object",
            &["namespace"],
        )?;

        let status = gauge_vec(
            controller,
            "canary_status",
            "Last canary analysis result",
            &["name", "namespace"],
        )?;

        let phase = gauge_vec(
            controller,
            "canary_phase",
            "Condition of a canary at the current time",
            &["name", "namespace"],
        )?;

        let webhook_confirm_rollout = gauge_vec(
            controller,
            "canary_webhook_confirm_rollout",
            "greater than 0 if confirm_rollout webhook failed",
            &["name", "namespace"],
        )?;

        let webhook_confirm_traffic_increase = gauge_vec(
            controller,
            "canary_webhook_confirm_traffic_increase",
            "greater than 0 if confirm_traffic_increase webhook failed",
            &["name", "namespace"],
        )?;

        let webhook_confirm_promotion = gauge_vec(
            controller,
            "canary_webhook_confirm_promotion",
            "greater than 0 if confirm_promotion webhook failed",
            &["name", "namespace"],
        )?;

        let weight = gauge_vec(
            controller,
            "canary_weight",
            "The virtual service destination weight current value",
            &["workload", "namespace"],
        )?;

        let recorder = Recorder {
            info,
            duration,
            total,
            status,
            phase,
            webhook_confirm_rollout,
            webhook_confirm_traffic_increase,
            webhook_confirm_promotion,
            weight,
        };

        match registry {
            Some(registry) => {
                recorder.register(controller, registry)?;
                info!(controller, "Registered canary metrics");
            }
            None => debug!(controller, "Created unregistered canary metrics"),
        }

        Ok(recorder)
    }

    fn collectors(&self) -> Vec<(&'static str, Box<dyn Collector>)> {
        fn boxed<C: Collector + Clone + 'static>(collector: &C) -> Box<dyn Collector> {
            Box::new(collector.clone())
        }

        vec![
            ("info", boxed(&self.info)),
            ("canary_duration_seconds", boxed(&self.duration)),
            ("canary_total", boxed(&self.total)),
            ("canary_status", boxed(&self.status)),
            ("canary_phase", boxed(&self.phase)),
            (
                "canary_webhook_confirm_rollout",
                boxed(&self.webhook_confirm_rollout),
            ),
            (
                "canary_webhook_confirm_traffic_increase",
                boxed(&self.webhook_confirm_traffic_increase),
            ),
            (
                "canary_webhook_confirm_promotion",
                boxed(&self.webhook_confirm_promotion),
            ),
            ("canary_weight", boxed(&self.weight)),
        ]
    }

    /// Registers all instruments or none: on failure the ones already added
    /// are unregistered again before the error is returned.
    fn register(&self, controller: &str, registry: &Registry) -> Result<(), RecorderError> {
        for (index, (name, collector)) in self.collectors().into_iter().enumerate() {
            if let Err(source) = registry.register(collector) {
                let metric = fq_name(controller, name);
                error!(metric = %metric, error = %source, "Failed to register canary metric");

                for (registered, collector) in self.collectors().into_iter().take(index) {
                    if let Err(e) = registry.unregister(collector) {
                        warn!(
                            metric = %fq_name(controller, registered),
                            error = %e,
                            "Failed to roll back canary metric registration"
                        );
                    }
                }
                return Err(RecorderError::Registration { metric, source });
            }
        }
        Ok(())
    }
}

impl CanaryRecorder for Recorder {
    fn set_info(&self, version: &str, mesh_provider: &str) {
        self.info.with_label_values(&[version, mesh_provider]).set(1.0);
    }

    fn set_duration(&self, canary: &Canary, elapsed: Duration) {
        self.duration
            .with_label_values(&[canary.target_name(), canary.namespace.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    fn set_total(&self, namespace: &str, total: usize) {
        self.total.with_label_values(&[namespace]).set(total as f64);
    }

    fn set_status(&self, canary: &Canary, phase: CanaryPhase) {
        let status = CanaryStatus::from_phase(phase);
        self.status
            .with_label_values(&[canary.target_name(), canary.namespace.as_str()])
            .set(status.code() as f64);
    }

    fn set_webhook_confirm_rollout(&self, canary: &Canary, status: WebhookStatus) {
        self.webhook_confirm_rollout
            .with_label_values(&[canary.target_name(), canary.namespace.as_str()])
            .set(status.value());
    }

    fn set_webhook_confirm_traffic_increase(&self, canary: &Canary, status: WebhookStatus) {
        self.webhook_confirm_traffic_increase
            .with_label_values(&[canary.target_name(), canary.namespace.as_str()])
            .set(status.value());
    }

    fn set_webhook_confirm_promotion(&self, canary: &Canary, status: WebhookStatus) {
        self.webhook_confirm_promotion
            .with_label_values(&[canary.target_name(), canary.namespace.as_str()])
            .set(status.value());
    }

    fn set_phase(&self, canary: &Canary, phase: CanaryPhase) {
        self.phase
            .with_label_values(&[canary.target_name(), canary.namespace.as_str()])
            .set(phase_code(phase) as f64);
    }

    /// Writes two series: `<target>-primary` carries the primary weight and
    /// `<target>` the canary weight. Both must come from the same routing
    /// decision so they stay consistent with each other.
    fn set_weight(&self, canary: &Canary, primary: i64, canary_weight: i64) {
        let primary_workload = canary.primary_workload();
        self.weight
            .with_label_values(&[primary_workload.as_str(), canary.namespace.as_str()])
            .set(primary as f64);
        self.weight
            .with_label_values(&[canary.target_name(), canary.namespace.as_str()])
            .set(canary_weight as f64);
    }

    fn remove_canary(&self, canary: &Canary) -> usize {
        let name = canary.target_name();
        let namespace = canary.namespace.as_str();
        let primary_workload = canary.primary_workload();

        let mut removed = [
            self.duration.remove_label_values(&[name, namespace]).is_ok(),
            self.status.remove_label_values(&[name, namespace]).is_ok(),
            self.phase.remove_label_values(&[name, namespace]).is_ok(),
            self.webhook_confirm_rollout
                .remove_label_values(&[name, namespace])
                .is_ok(),
            self.webhook_confirm_traffic_increase
                .remove_label_values(&[name, namespace])
                .is_ok(),
            self.webhook_confirm_promotion
                .remove_label_values(&[name, namespace])
                .is_ok(),
        ]
        .iter()
        .filter(|ok| **ok)
        .count();

        for workload in [primary_workload.as_str(), name] {
            if self
                .weight
                .remove_label_values(&[workload, namespace])
                .is_ok()
            {
                removed += 1;
            }
        }

        debug!(canary = %canary.name, namespace, removed, "Removed canary series");
        removed
    }
}

/// Renders every metric in `registry` in Prometheus text format.
pub fn render(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
