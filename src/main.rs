use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use pipeline_generator::config::ServerConfig;
use pipeline_generator::llm::OpenAiClient;
use pipeline_generator::logging::init_logging;
use pipeline_generator::server::{cors_layer, router, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level)?;

    let api_key = config.api_key.clone().unwrap_or_else(|| {
        tracing::warn!("OPENAI_API_KEY is not set; completion requests will be rejected upstream");
        String::new()
    });

    let gateway = OpenAiClient::with_timeout(&config.base_url, api_key, config.llm_timeout())
        .map_err(|e| anyhow!("Failed to build completion client: {e}"))?;

    let app = router(AppState::new(Arc::new(gateway), &config.model))
        .layer(cors_layer(&config.cors_origins)?);

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {e}", config.bind))?;

    tracing::info!(addr = %config.bind, model = %config.model, base_url = %config.base_url, "pipeline generator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
}
