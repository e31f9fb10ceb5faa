use std::process::ExitCode;

use tracing::{error, info};

use finboard::{Config, Database, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = finboard::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        finboard::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    info!("finboard - message board backend");

    let db = match Database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::from_database(&config, db) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to configure web server: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Server configured on {}", server.addr());

    if let Err(e) = server.run().await {
        error!("Web server stopped: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
