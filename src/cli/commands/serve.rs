use anyhow::Context;

use crate::cli::open_store;
use crate::config::config;
use crate::is_production;
use crate::routes::app;
use crate::state::AppState;

pub async fn handle(seed: bool) -> anyhow::Result<()> {
    let config = config();
    tracing::info!("Starting Wanderlust in {:?} mode", config.environment);

    if is_production!() && !config.session.secure_cookie {
        tracing::warn!("Session cookies are not marked secure in production");
    }

    let store = open_store(config).await?;
    if seed {
        let (owner, count) = super::seed::load(store.as_ref()).await?;
        tracing::info!("Seeded {} listings owned by '{}'", count, owner);
    }

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Wanderlust listening on http://{}", bind_addr);

    let served = axum::serve(listener, app(AppState::from(store.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    served.context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
