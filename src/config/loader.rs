//! Configuration loading from disk and from the command line.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::cli::Options;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
}

/// Read a TOML configuration file without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration from parsed command-line options.
///
/// With `--config`, the file is the base and explicit options override it;
/// command-line routes are appended to the file's routes.
pub fn from_options(options: Options) -> Result<ProxyConfig, ConfigError> {
    let base = match &options.config {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    let config = options.apply(base);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
