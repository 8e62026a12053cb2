//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the route table from validated configuration
//! - Start the metrics exporter when configured
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and returned, never panicked
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{RouteTable, RouteTableError};

/// Errors that stop the router from starting (or keep it from serving).
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Routes(#[from] RouteTableError),

    #[error("invalid metrics address {address}: {reason}")]
    MetricsAddress { address: String, reason: String },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Compile the route table described by `config`.
pub fn build_route_table(config: &ProxyConfig) -> Result<RouteTable, RouteTableError> {
    let table = RouteTable::build(config.route_definition())?;
    tracing::info!(
        selector = %table.selector(),
        routes = table.entries().len(),
        default_target = %table.default_target(),
        "Route table compiled"
    );
    Ok(table)
}

/// Start the router and serve until shutdown or a fatal listener error.
pub async fn run(config: ProxyConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let table = build_route_table(&config)?;

    if let Some(address) = &config.observability.metrics_address {
        let addr: SocketAddr = address.parse().map_err(|e: std::net::AddrParseError| {
            StartupError::MetricsAddress {
                address: address.clone(),
                reason: e.to_string(),
            }
        })?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listen_at)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listen_at.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let stop = shutdown.subscribe();
    if shutdown.is_triggered() {
        tracing::info!("Shutdown requested before serving");
        return Ok(());
    }

    let server = HttpServer::new(config, table);
    server.run(listener, stop).await?;
    Ok(())
}
