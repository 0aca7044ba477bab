//! services/api/src/bin/api.rs

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yaydoc_api::{
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Prepare the Artifact Root ---
    tokio::fs::create_dir_all(&config.artifact_root).await?;
    info!("Serving artifacts from {}", config.artifact_root.display());
    info!(
        "Generator: {} (timeout {}s)",
        config.generator_program.display(),
        config.generation_timeout.as_secs()
    );

    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::from_config(config.clone()));
    let app = router(app_state)?;

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
