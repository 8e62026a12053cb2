//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::{ProxyConfig, RouteConfig};

#[derive(Debug, Parser)]
#[command(name = "simple-router")]
#[command(about = "Routes requests to upstream targets by header or cookie value", long_about = None)]
pub struct Options {
    /// The address:port to listen at [default: localhost:0]
    #[arg(short, long)]
    pub listen_at: Option<String>,

    /// Route definition: <selector-pattern>;<target>
    #[arg(short, long = "route", value_name = "ROUTE", value_parser = RouteConfig::parse)]
    pub routes: Vec<RouteConfig>,

    /// The header containing the discriminator onto which the routing will be applied
    #[arg(long, conflicts_with = "cookie_name")]
    pub header_name: Option<String>,

    /// The cookie containing the discriminator onto which the routing will be applied
    #[arg(long)]
    pub cookie_name: Option<String>,

    /// Target receiving requests that match no route
    #[arg(short, long)]
    pub default_target: Option<String>,

    /// TOML configuration file; explicit options override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Address for the Prometheus metrics endpoint
    #[arg(long)]
    pub metrics_address: Option<String>,

    /// Whole-request timeout in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}

impl Options {
    /// Overlay explicitly given options onto `base`.
    pub fn apply(self, mut base: ProxyConfig) -> ProxyConfig {
        if let Some(listen_at) = self.listen_at {
            base.listen_at = listen_at;
        }
        base.routes.extend(self.routes);

        // The selector is a single setting: naming either source replaces both.
        if self.header_name.is_some() || self.cookie_name.is_some() {
            base.header_name = self.header_name;
            base.cookie_name = self.cookie_name;
        }

        if let Some(default_target) = self.default_target {
            base.default_target = default_target;
        }
        if let Some(log_level) = self.log_level {
            base.observability.log_level = log_level;
        }
        if let Some(addr) = self.metrics_address {
            base.observability.metrics_address = Some(addr);
        }
        if let Some(secs) = self.request_timeout_secs {
            base.timeouts.request_secs = secs;
        }
        base
    }
}
