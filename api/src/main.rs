//! Serve an already-encoded animation without re-running the pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use earth_gif_api::{serve, AppState};
use earth_gif_common::config::Config;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match &config_path {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    if let Some(path) = &config_path {
        debug!(path = path.display().to_string(), "config loaded");
    }

    let state = Arc::new(AppState {
        gif_path: config.output.gif_path.clone(),
    });

    let addr = config.server.addr();
    info!(addr, "earth-gif API server starting");
    if let Err(e) = serve(&addr, state).await {
        error!(addr, error = %e, "server failed");
        std::process::exit(1);
    }
}
