//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line (+ optional TOML file)
//!     → cli.rs (parse options)
//!     → loader.rs (read file, overlay options)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → RouteDefinition for the routing subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde/clap) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Options;
pub use loader::{from_options, load_config, ConfigError};
pub use schema::{ObservabilityConfig, ProxyConfig, RouteConfig, TimeoutConfig};
pub use validation::ValidationError;
