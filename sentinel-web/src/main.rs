use std::net::SocketAddr;
use std::time::Duration;

use sentinel_core::{RetentionSweeper, TelemetryGenerator};
use sentinel_web::{create_app, AppState, WebConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing with environment filter
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Sentinel web server");

    let config = match WebConfig::load() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully, port: {}", config.port);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    tracing::info!("Initializing database with URL: {}", config.database_url);
    let state = AppState::new(config.clone()).await?;

    // Background engine: telemetry generator and retention sweeper run as
    // independent repeating tasks from process start until shutdown.
    let shutdown = CancellationToken::new();

    let generator = TelemetryGenerator::new(state.registry.clone(), state.store.clone())
        .with_tick(Duration::from_secs(config.metrics_interval_secs));
    tokio::spawn(generator.run(shutdown.clone()));

    let sweeper = RetentionSweeper::new(state.store.clone())
        .with_period(Duration::from_secs(config.sweep_interval_secs));
    tokio::spawn(sweeper.run(shutdown.clone()));

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting Sentinel web server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutdown signal received");
                shutdown.cancel();
            }
        })
        .await?;

    shutdown.cancel();
    Ok(())
}
