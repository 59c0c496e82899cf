use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "CANARY_METRICS_CONFIG";

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "CANARY_METRICS_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    /// Subsystem prefixed to every metric name.
    #[serde(default = "default_controller")]
    pub controller: String,
    /// Service mesh or ingress provider published in the info metric.
    pub mesh_provider: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_controller() -> String {
    "flagger".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Path of the configuration file, `./config.yaml` unless overridden.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./config.yaml"))
}

/// Load config from a YAML file, with `CANARY_METRICS_*` variables on top.
pub fn load_config(path: &Path) -> Result<ConfigV1, figment::Error> {
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]));
    extract_config(figment)
}

/// Extract a versioned configuration from any figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// JSON schema of the configuration.
pub fn schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
version: "1.0.0"
controller: "flagger"
mesh_provider: "istio"
bind_address: "127.0.0.1:9090"
logging:
  level: "debug"
  format: "console"
"#;

    fn parse(yaml: &str) -> Result<ConfigV1, figment::Error> {
        extract_config(Figment::new().merge(Yaml::string(yaml)))
    }

    #[test]
    fn test_full_config() {
        let config = parse(FULL_CONFIG).expect("config should parse");

        assert_eq!(config.controller, "flagger");
        assert_eq!(config.mesh_provider, "istio");
        assert_eq!(config.bind_address, "127.0.0.1:9090");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "console");
        assert_eq!(config.logging.service_name, env!("CARGO_PKG_NAME"));
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse(
            r#"
version: "1.0.0"
mesh_provider: "linkerd"
"#,
        )
        .expect("config should parse");

        assert_eq!(config.controller, "flagger");
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_unknown_version_rejected() {
        let result = parse(
            r#"
version: "2.0.0"
mesh_provider: "istio"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_mesh_provider_rejected() {
        let result = parse(
            r#"
version: "1.0.0"
controller: "flagger"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_names_fields() {
        let schema = schema().expect("schema should serialise");
        assert!(schema.contains("mesh_provider"));
        assert!(schema.contains("bind_address"));
    }
}
