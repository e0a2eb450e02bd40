//! storefront-server binary

use storefront_server::utils::init_logger;
use storefront_server::{AppState, Config, api};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;
    init_logger(&config.log_level, config.log_json)?;

    if config.jwt_secret_generated {
        tracing::warn!("JWT_SECRET missing or too short, using a temporary development key");
    }

    tracing::info!(
        "Starting storefront-server v{} (env: {})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let state = AppState::new(&config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize state: {e}"))?;
    let app = api::build_app(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("storefront-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("storefront-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
