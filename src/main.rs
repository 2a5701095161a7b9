mod config;
mod db;
mod error;
mod fixtures;
mod handlers;
mod models;
mod views;
mod voting;

use config::Config;
use db::Database;
use handlers::AppState;
use log::{error, info};
use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize database
    let database = match Database::new(&config.database_url, config.max_connections).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("loaddata") => {
            let Some(path) = args.get(2) else {
                error!("Usage: {} loaddata <fixtures.json>", program_name(&args));
                return ExitCode::FAILURE;
            };
            match fixtures::load_file(database.as_ref(), Path::new(path)).await {
                Ok(count) => {
                    info!("Loaded {} question(s) from {}", count, path);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to load fixtures: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Some(other) => {
            error!("Unknown command: {}", other);
            ExitCode::FAILURE
        }
        None => serve(&config, database).await,
    }
}

fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("friday-poll")
}

async fn serve(config: &Config, database: Arc<Database>) -> ExitCode {
    let app = handlers::router(AppState::new(database));

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.bind_addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Serving polls on http://{}/polls/", config.bind_addr);
    if let Err(why) = axum::serve(listener, app).await {
        error!("Server error: {:?}", why);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
