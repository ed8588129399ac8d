use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use earth_gif::dates;
use earth_gif::pipeline::{self, PipelineError};
use earth_gif_api::AppState;
use earth_gif_catalog::CatalogClient;
use earth_gif_common::config::Config;
use tracing::{debug, error, info};

/// Build a captioned animation of a day of full-disc Earth imagery and serve it over HTTP.
#[derive(Debug, Parser)]
#[command(name = "earth-gif", version)]
struct Args {
    /// Day to animate, YYYY-MM-DD (default: the most recent day with imagery).
    #[arg(long)]
    date: Option<String>,

    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match &args.config {
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

    if let Some(path) = &args.config {
        debug!(path = path.display().to_string(), "config loaded");
    }

    let api_key = match config.api_key() {
        Ok(k) => k,
        Err(e) => {
            error!(error = %e, "missing API credential");
            std::process::exit(1);
        }
    };

    let client = match CatalogClient::new(&config.catalog, api_key) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!(error = %e, "failed to create catalog client");
            std::process::exit(1);
        }
    };

    let date = match &args.date {
        Some(raw) => match resolve_date(&client, &config, raw).await {
            Ok(d) => Some(d),
            Err(e) => {
                error!(error = %e, "invalid --date");
                std::process::exit(1);
            }
        },
        None => None,
    };

    info!(
        date = date.as_deref().unwrap_or("latest"),
        base_url = %config.catalog.base_url,
        "starting earth-gif"
    );

    if let Err(e) = pipeline::run(Arc::clone(&client), &config, date.as_deref()).await {
        error!(error = %e, "pipeline failed");
        std::process::exit(1);
    }

    let addr = config.server.addr();
    info!("Now you can go to http://localhost:{}/gif and see the result!", config.server.port);
    info!(
        "Or use this command to download the GIF: 'curl -v -X POST http://localhost:{}/gif > temp.gif'",
        config.server.port
    );
    info!("(Ctrl+C to quit)");

    let state = Arc::new(AppState {
        gif_path: config.output.gif_path.clone(),
    });
    if let Err(e) = earth_gif_api::serve(&addr, state).await {
        error!(addr, error = %e, "server failed");
        std::process::exit(1);
    }
}

/// Validate `--date` against the archive window, then settle on a day with imagery.
async fn resolve_date(
    client: &CatalogClient,
    config: &Config,
    raw: &str,
) -> Result<String, PipelineError> {
    let earliest = dates::parse(&config.catalog.earliest_date)?;
    let today = chrono::Local::now().date_naive();
    let requested = dates::validate(raw, earliest, today)?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let chosen = pipeline::select_date(client, requested, &mut input, &mut output).await?;
    Ok(dates::format(chosen))
}
