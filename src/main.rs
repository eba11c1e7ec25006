use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use tika_gateway::config::load_from_env;
use tika_gateway::engine::TikaEngine;
use tika_gateway::lifecycle::{shutdown_signal, Shutdown};
use tika_gateway::observability::{logging, metrics};
use tika_gateway::GatewayServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    logging::init_logging(&config.observability)?;

    tracing::info!("tika-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_placeholder() {
        tracing::warn!("Using the placeholder API key; set TIKA_SECRET before exposing this service");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        engine_url = %config.engine.base_url,
        managed_engine = !config.engine.command.is_empty(),
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }

    let engine = Arc::new(TikaEngine::new(&config.engine, &config.timeouts)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on(shutdown_signal());

    let server = GatewayServer::new(config, engine);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
