//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and clap handle syntax)
//! - Exactly one discriminator source (header or cookie)
//! - Required values present (routes, default target)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Pattern and URL checks belong to route table construction

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one route is required")]
    NoRoutes,

    #[error("header-name and cookie-name are mutually exclusive")]
    ConflictingSelectors,

    #[error("one of header-name or cookie-name is required")]
    MissingSelector,

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen_at.trim().is_empty() {
        errors.push(ValidationError::Empty("listen-at"));
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    match (&config.header_name, &config.cookie_name) {
        (Some(_), Some(_)) => errors.push(ValidationError::ConflictingSelectors),
        (None, None) => errors.push(ValidationError::MissingSelector),
        (Some(name), None) if name.is_empty() => errors.push(ValidationError::Empty("header-name")),
        (None, Some(name)) if name.is_empty() => errors.push(ValidationError::Empty("cookie-name")),
        _ => {}
    }

    if config.default_target.is_empty() {
        errors.push(ValidationError::Empty("default-target"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
