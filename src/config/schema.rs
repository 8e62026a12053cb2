//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same structure can be read from a
//! TOML file or assembled from command-line options.

use serde::{Deserialize, Serialize};

use crate::routing::{RouteDefinition, SelectorKind};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address the server binds to (e.g., "localhost:0").
    pub listen_at: String,

    /// Pattern → target routes, in configuration order.
    pub routes: Vec<RouteConfig>,

    /// Route on this header.
    pub header_name: Option<String>,

    /// Route on this cookie.
    pub cookie_name: Option<String>,

    /// Target used when no route matches.
    pub default_target: String,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_at: "localhost:0".to_string(),
            routes: Vec::new(),
            header_name: None,
            cookie_name: None,
            default_target: String::new(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Selector implied by the header/cookie options.
    ///
    /// Header wins when both are set; validation rejects that case before
    /// this is consulted at startup.
    pub fn selector(&self) -> (Option<SelectorKind>, String) {
        match (&self.header_name, &self.cookie_name) {
            (Some(name), _) => (Some(SelectorKind::Header), name.clone()),
            (None, Some(name)) => (Some(SelectorKind::Cookie), name.clone()),
            (None, None) => (None, String::new()),
        }
    }

    /// Routing input for `RouteTable::build`.
    pub fn route_definition(&self) -> RouteDefinition {
        let (selector_kind, selector_name) = self.selector();
        RouteDefinition {
            selector_kind,
            selector_name,
            routes: self
                .routes
                .iter()
                .map(|r| (r.pattern.clone(), r.target.clone()))
                .collect(),
            default_target: self.default_target.clone(),
        }
    }
}

/// A single `pattern → target` route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Regular expression matched against the discriminator.
    pub pattern: String,

    /// Upstream URL receiving matching requests.
    pub target: String,
}

impl RouteConfig {
    /// Parse `<pattern>;<target>`. The target is everything after the last `;`,
    /// so patterns may contain `;` but targets may not.
    pub fn parse(route: &str) -> Result<Self, String> {
        let (pattern, target) = route
            .rsplit_once(';')
            .ok_or_else(|| format!("route {route:?} must be formatted as <pattern>;<target>"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            target: target.to_string(),
        })
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus endpoint bind address. No exporter when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "debug".to_string(),
            metrics_address: None,
        }
    }
}
