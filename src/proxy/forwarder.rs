//! The forwarding agent.
//!
//! Relays one request to one upstream target and returns the upstream
//! response. Connection pooling, keep-alive and streaming are owned by the
//! hyper client; the router only decides *where* a request goes.

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, Version},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

use crate::proxy::rewrite::{append_forwarded_for, rewrite_uri, strip_hop_by_hop};

/// Failure to relay a request upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("cannot build upstream URI {0}")]
    InvalidUri(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Relays a request to a target.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, target: &Url, request: Request<Body>) -> Result<Response<Body>, ForwardError>;
}

/// Forwarder backed by a pooled hyper client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
}

impl HttpForwarder {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HttpForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, target: &Url, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = rewrite_uri(target, &parts.uri)?;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            append_forwarded_for(&mut parts.headers, addr.ip());
        }

        let response: Response<Incoming> = self.client.request(Request::from_parts(parts, body)).await?;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
