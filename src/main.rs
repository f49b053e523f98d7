use userhub::config::AppConfig;
use userhub::observability::{init_logging, log_config_info};

#[tokio::main]
async fn main() {
    // Load .env in development; missing file is fine.
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.observability, config.environment) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    log_config_info(&config);

    if let Err(e) = userhub::startup::run(config).await {
        tracing::error!(error = %e, "Service terminated with error");
        std::process::exit(1);
    }
}
