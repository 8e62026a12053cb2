//! simple-router
//!
//! Reverse HTTP router selecting upstream targets by header or cookie value.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::extractor ──▶ routing::router
//!                                                                   │
//!                                          matched targets / default target
//!                                                                   ▼
//!     Client Response ◀──────────────────────────────────── proxy::forwarder ◀──▶ Upstream(s)
//! ```
//!
//! Exit codes: 1 on configuration or startup failure, 2 on usage errors.

use std::process::ExitCode;

use clap::Parser;

use simple_router::config::{self, Options};
use simple_router::lifecycle::{signals, startup, Shutdown};
use simple_router::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let options = Options::parse();

    let config = match config::from_options(options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("failed to initialize logging: {e}");
    }

    tracing::info!("simple-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(config = ?config, "Configuration loaded");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    match startup::run(config, &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Router stopped");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
