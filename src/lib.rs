//! Header/cookie based reverse HTTP router.
//!
//! Reads one discriminator value from every request (a header or a cookie),
//! matches it against a table of regular expressions and forwards the request
//! to every matching upstream target, or to the default target when nothing
//! matches.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteDefinition, RouteTable, Router};
