//! relayd — chat relay daemon.

use anyhow::{Context, Result};

use relay_core::config::RelayConfig;
use relay_services::{Listener, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = RelayConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let mut config = RelayConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        RelayConfig::default()
    });

    if let Some(port) = std::env::args().nth(1) {
        config.network.port = port.parse().context("port argument must be a number")?;
    }
    tracing::info!(
        listen = %config.network.listen_addr(),
        api_port = config.network.api_port,
        max_frame_bytes = config.limits.max_frame_bytes,
        outbound_queue = config.limits.outbound_queue,
        "relayd starting"
    );

    // Shared state
    let registry = Registry::new();

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let listener = Listener::bind(
        config.network.listen_addr(),
        registry.clone(),
        &config.limits,
        shutdown_tx.subscribe(),
    )
    .await
    .with_context(|| format!("failed to bind {}", config.network.listen_addr()))?;
    let listen_addr = listener.local_addr()?;

    let listener_task = tokio::spawn(listener.run());

    if config.network.api_port != 0 {
        let state = relay_api::ApiState::new(registry.clone(), listen_addr);
        let port = config.network.api_port;
        tokio::spawn(async move {
            if let Err(e) = relay_api::serve(state, port).await {
                tracing::error!(error = %e, "status server failed");
            }
        });
    }

    // ── Wait for exit ────────────────────────────────────────────────────────

    // The listener returns once the shutdown signal fans out.
    if let Err(e) = listener_task.await {
        tracing::error!(error = %e, "listener task failed");
    }
    tracing::info!(active = registry.len(), "relayd stopped");

    Ok(())
}
