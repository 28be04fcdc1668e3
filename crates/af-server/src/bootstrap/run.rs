use std::future::Future;
use std::net::SocketAddr;

use af_core::config::{AppConfig, RelayConfig};
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::wiring::wire_dependencies;
use crate::relay::{router, RelayState};

/// Binds the relay listener at `bind_address:port`.
pub async fn bind_relay(config: &RelayConfig) -> anyhow::Result<TcpListener> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind relay on {addr}"))
}

/// Serves the relay until `shutdown` resolves, then drains in-flight
/// requests.
pub async fn start_server(
    listener: TcpListener,
    state: RelayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr: SocketAddr = listener.local_addr().context("Relay listener has no address")?;
    info!(%addr, "Verification relay listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Relay server failed")?;
    info!("Verification relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl-C, relay will not stop gracefully");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Wires the process from `config` and runs the relay until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let wired = wire_dependencies(&config).await?;
    info!(
        transport = ?config.verification.transport,
        public_base_url = %config.relay.public_base_url,
        "Storefront services wired"
    );
    let listener = bind_relay(&config.relay).await?;
    start_server(listener, wired.relay, shutdown_signal()).await
}
