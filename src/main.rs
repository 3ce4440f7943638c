//! fittrack - fitness tracking backend
//!
//! This is the main entry point for the fittrack server.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use fittrack::auth::{AuthManager, TokenService};
use fittrack::config::Config;
use fittrack::database::SqliteDatabase;
use fittrack::integrations::{
    ExerciseSource, GeminiRecommender, RapidApiExerciseClient, Recommender,
};
use fittrack::server::{AppState, Server};
use fittrack::telemetry::init_tracing;

/// fittrack - fitness tracking backend
#[derive(Parser, Debug)]
#[command(name = "fittrack")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "FITTRACK_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load and validate configuration; a missing signing secret stops here
    let config = load_config(&args)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting fittrack");

    // Initialize database
    let database = Arc::new(SqliteDatabase::new(&config.database.path).await?);
    info!(path = %config.database.path, "Database initialized");

    // Token service: the only holder of the signing secret
    let secret = config
        .auth
        .jwt_secret
        .as_deref()
        .context("auth.jwt_secret is required")?;
    let tokens = Arc::new(TokenService::new(secret, config.auth.token_lifetime())?);
    let auth_manager = Arc::new(AuthManager::new(
        Arc::clone(&database),
        tokens,
        config.auth.lookup_timeout(),
    ));
    info!(
        token_lifetime_secs = ?config.auth.token_lifetime_secs,
        "Authentication manager initialized"
    );

    // Optional integrations
    let exercises: Option<Arc<dyn ExerciseSource>> = match &config.exercise_api {
        Some(cfg) => match RapidApiExerciseClient::new(cfg) {
            Ok(client) => {
                info!(base_url = %cfg.base_url, "Exercise API enabled");
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!(error = %e, "Exercise API disabled");
                None
            }
        },
        None => None,
    };

    let recommender: Option<Arc<dyn Recommender>> = match &config.recommender {
        Some(cfg) => match GeminiRecommender::new(cfg) {
            Ok(client) => {
                info!(model = %cfg.model, "Recommender enabled");
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!(error = %e, "Recommender disabled");
                None
            }
        },
        None => None,
    };

    let state = AppState {
        auth_manager,
        database,
        exercises,
        recommender,
    };

    // Create and start the HTTP server
    let server = Server::new(config.server.clone(), state);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting HTTP server"
    );

    server.run(shutdown_signal()).await?;

    info!("fittrack shutdown complete");
    Ok(())
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
        None => {
            eprintln!("Loading configuration from environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
    }
}

/// Create a future that resolves when a shutdown signal is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
