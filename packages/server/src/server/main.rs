// Main entry point for the API proxy

use anyhow::{Context, Result};
use server_core::server::realtime::{serve_realtime, RealtimeState};
use server_core::{server::build_app, server::AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,ardhi_session=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ardhi API proxy");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    match &config.base_url {
        Some(url) => tracing::info!(base_url = %url, "Configuration loaded"),
        None => tracing::error!("BASE_URL is not defined in the environment variables."),
    }

    // Realtime acceptor runs alongside the HTTP server
    let realtime_port = config.realtime_port;
    tokio::spawn(async move {
        if let Err(e) = serve_realtime(realtime_port, RealtimeState::new()).await {
            tracing::error!(error = %e, "Realtime acceptor exited with error");
        }
    });

    // Build application
    let app = build_app(AppState::from_config(&config), &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
