use anyhow::Context;
use tracing::info;

use crate::cli::build_state;
use crate::config::AppConfig;
use crate::routes;
use crate::services::bootstrap::{self, Seeded};

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    info!("Starting server in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config).await?;

    match bootstrap::seed_from_config(&state).await {
        Ok(Some(Seeded::Created(admin))) => info!("Seeded admin account {}", admin.email),
        Ok(Some(Seeded::AlreadyPresent)) => info!("Bootstrap admin already present"),
        Ok(None) => {}
        Err(e) => anyhow::bail!("bootstrap admin rejected: {}", e),
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
