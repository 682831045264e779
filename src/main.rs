use std::sync::Arc;

use clap::{Parser, Subcommand};
use sitewatch::{
    auth::{ApiRequest, AuthDispatcher, RefreshCoordinator, SessionStore},
    cache::TelemetryCache,
    config::AppConfig,
    engine::AlertEngine,
    http_client::create_retryable_http_client,
    persistence::{FilePreferenceStore, PreferenceStore},
    providers::{HttpAuthExchange, HttpTelemetrySource},
    supervisor::Supervisor,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the telemetry poll loop against the configured dashboard API.
    Run {
        /// Path to the configuration file.
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config } => run_client(config.as_deref()).await?,
    }
    Ok(())
}

async fn run_client(config_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(config_path)?;
    tracing::debug!(api = %config.api_base_url, sites = ?config.sites, "Configuration loaded");

    let store = Arc::new(FilePreferenceStore::new(&config.preferences_path));
    let session = Arc::new(SessionStore::from_pair(store.load_credentials().await?));
    if session.access_credential().await.is_none() {
        tracing::warn!("No persisted credentials; requests will fail until a session is stored");
    }

    let client = Arc::new(create_retryable_http_client(&config.http_retry_config)?);
    let exchange = Arc::new(HttpAuthExchange::new(config.api_base_url.clone(), client.clone()));
    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::clone(&session),
        exchange,
        store.clone(),
        config.refresh_wait_secs,
    ));
    let dispatcher = Arc::new(AuthDispatcher::new(
        config.api_base_url.clone(),
        client,
        Arc::clone(&session),
        coordinator,
    ));

    // Validate the persisted session once at startup; a failure here is
    // informational, the first 401 will trigger renewal anyway.
    match dispatcher.dispatch(&ApiRequest::get("/me")).await {
        Ok(response) if response.status().is_success() => {
            tracing::info!("Session validated");
        }
        Ok(response) => {
            tracing::warn!(status = %response.status(), "Session validation rejected");
        }
        Err(e) => tracing::warn!(error = %e, "Session validation unavailable"),
    }

    // A persisted poll-interval preference overrides the configured default.
    let poll_interval = match store.poll_interval_ms().await? {
        Some(ms) => std::time::Duration::from_millis(ms),
        None => config.polling_interval_ms,
    };

    let source = Arc::new(HttpTelemetrySource::new(dispatcher));
    let cache = Arc::new(TelemetryCache::new(source, poll_interval));
    let engine = AlertEngine::new(config.thresholds.clone());

    let supervisor =
        Supervisor::new(cache, engine, config.sites.clone(), &config.window_hours, poll_interval)?;
    supervisor.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
