//! RPS Arena Server
//!
//! Listens for WebSocket clients and runs matches until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rps_arena::{GameServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let config = ServerConfig::from_env().context("failed to load configuration")?;

    info!("RPS Arena Server v{}", VERSION);
    info!("Max connections: {}", config.max_connections);
    if config.session.reap_abandoned_matches {
        info!("Reaping abandoned matches every {:?}", config.cleanup_interval);
    }
    if config.session.preserve_wins_on_relogin {
        info!("Win counts survive re-login");
    }

    let bind_addr = config.bind_addr;
    let server = Arc::new(GameServer::new(config));

    let signal_server = server.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_server.shutdown(),
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    server
        .run()
        .await
        .with_context(|| format!("server on {bind_addr} failed"))?;

    info!("Server stopped");
    Ok(())
}
