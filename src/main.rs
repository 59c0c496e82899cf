use std::sync::Arc;

use canary_metrics::config::{config_path, load_config, schema};
use canary_metrics::startup;
use canary_metrics::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    if std::env::args().nth(1).as_deref() == Some("--schema") {
        match schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Error generating configuration schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let path = config_path();
    let config = match load_config(&path) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(config).await {
        error!(error = %e, "Metrics server stopped");
        std::process::exit(1);
    }
}
