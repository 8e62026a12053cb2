//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all proxy handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Read the discriminator and resolve targets through the routing engine
//! - Forward the request to every resolved target
//! - Observability (metrics, request IDs)

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::config::ProxyConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;
use crate::proxy::{Forwarder, HttpForwarder};
use crate::routing::{RouteTable, Router as RequestRouter};

/// Largest body buffered when one request fans out to several targets.
pub const MAX_FANOUT_BODY: usize = 2 * 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RequestRouter>,
    pub forwarder: Arc<dyn Forwarder>,
}

/// HTTP server for the router.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server forwarding through the pooled HTTP client.
    pub fn new(config: ProxyConfig, table: RouteTable) -> Self {
        Self::with_forwarder(config, table, Arc::new(HttpForwarder::new()))
    }

    /// Create a server with a custom forwarding agent.
    pub fn with_forwarder(config: ProxyConfig, table: RouteTable, forwarder: Arc<dyn Forwarder>) -> Self {
        let state = AppState {
            router: Arc::new(RequestRouter::with_default_span(table)),
            forwarder,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Serve on `listener` until it fails or `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Reads the discriminator, resolves targets and forwards to each of them.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();

    let value = match state.router.discriminator(request.headers()) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Rejecting request");
            metrics::record_extraction_error();
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let resolution = state.router.resolve(&value);
    if resolution.is_default() {
        metrics::record_default_fallback();
    }
    let targets = resolution.targets();
    metrics::record_fanout(targets.len());

    if let [target] = targets.as_slice() {
        return forward_one(&state, target, request, &request_id).await;
    }

    // Fan-out: every target gets its own copy; the client sees the last response.
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_FANOUT_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot buffer request body for fan-out");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let mut response = None;
    for target in targets {
        if let Some(previous) = response.take() {
            drain(previous).await;
        }
        let request = replicate(&parts, body.clone());
        response = Some(forward_one(&state, target, request, &request_id).await);
    }
    response.unwrap_or_else(|| StatusCode::BAD_GATEWAY.into_response())
}

async fn forward_one(state: &AppState, target: &Url, request: Request<Body>, request_id: &str) -> Response {
    let start = Instant::now();
    match state.forwarder.forward(target, request).await {
        Ok(response) => {
            metrics::record_forward(target.as_str(), response.status().as_u16(), start);
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Upstream error");
            metrics::record_forward(target.as_str(), StatusCode::BAD_GATEWAY.as_u16(), start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Rebuild a request from buffered parts.
fn replicate(parts: &Parts, body: Bytes) -> Request<Body> {
    let mut request = Request::new(Body::from(body));
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = parts.uri.clone();
    *request.version_mut() = parts.version;
    *request.headers_mut() = parts.headers.clone();
    if let Some(info) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        request.extensions_mut().insert(info.clone());
    }
    request
}

async fn drain(response: Response) {
    if let Err(e) = axum::body::to_bytes(response.into_body(), usize::MAX).await {
        tracing::debug!(error = %e, "Discarding superseded upstream response");
    }
}
