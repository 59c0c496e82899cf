#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use canary_metrics::config::{extract_config, ConfigV1};
use canary_metrics::routes::create_router;
use canary_metrics::startup::build_state;
use canary_metrics::state::AppState;
use figment::providers::{Format, Yaml};
use figment::Figment;
use prometheus::proto::{Metric, MetricFamily};
use prometheus::Registry;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
controller: "flagger"
mesh_provider: "istio"
bind_address: 127.0.0.1:8081
logging:
  level: "debug"
  format: "json"
"#;

pub fn load_test_config() -> ConfigV1 {
    extract_config(Figment::new().merge(Yaml::string(TEST_CONFIG)))
        .expect("Failed to parse test config YAML")
}

pub fn build_app(config: ConfigV1) -> (Router, AppState) {
    let state = build_state(Arc::new(config)).expect("recorder should register");
    (create_router(state.clone()), state)
}

pub fn request(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub fn family(registry: &Registry, name: &str) -> Option<MetricFamily> {
    registry
        .gather()
        .into_iter()
        .find(|family| family.get_name() == name)
}

fn matches_labels(metric: &Metric, labels: &[(&str, &str)]) -> bool {
    labels.iter().all(|(name, value)| {
        metric
            .get_label()
            .iter()
            .any(|pair| pair.get_name() == *name && pair.get_value() == *value)
    })
}

/// Value of the gauge series of `name` carrying all of `labels`.
pub fn gauge(registry: &Registry, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    family(registry, name)?
        .get_metric()
        .iter()
        .find(|metric| matches_labels(metric, labels))
        .map(|metric| metric.get_gauge().get_value())
}

/// Sample count and sum of the histogram series of `name` carrying `labels`.
pub fn histogram(registry: &Registry, name: &str, labels: &[(&str, &str)]) -> Option<(u64, f64)> {
    family(registry, name)?
        .get_metric()
        .iter()
        .find(|metric| matches_labels(metric, labels))
        .map(|metric| {
            let histogram = metric.get_histogram();
            (histogram.get_sample_count(), histogram.get_sample_sum())
        })
}
