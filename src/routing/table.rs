//! Route table construction.
//!
//! # Responsibilities
//! - Validate the selector (kind set, name non-empty)
//! - Parse every target (routes and default) as an absolute URL
//! - Compile every pattern
//! - Freeze the result as an immutable table shared by all requests
//!
//! Validation happens in that order, so a bad selector is reported before a
//! bad URL and a bad URL before a bad pattern.

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::routing::compiler::compile_pattern;
use crate::routing::selector::{Selector, SelectorKind};

/// Errors raised while building a route table. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("missing selector type")]
    MissingSelectorType,

    #[error("missing selector name")]
    MissingSelectorName,

    #[error("failed to parse URL {target}: {reason}")]
    InvalidTargetUrl { target: String, reason: String },

    #[error("invalid selector pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Unvalidated routing input, as produced by the configuration layer.
#[derive(Debug, Clone, Default)]
pub struct RouteDefinition {
    pub selector_kind: Option<SelectorKind>,
    pub selector_name: String,
    /// `(pattern, target)` pairs in configuration order.
    pub routes: Vec<(String, String)>,
    pub default_target: String,
}

impl RouteDefinition {
    /// Convenience constructor for header-based routing.
    pub fn header(name: impl Into<String>, default_target: impl Into<String>) -> Self {
        Self {
            selector_kind: Some(SelectorKind::Header),
            selector_name: name.into(),
            routes: Vec::new(),
            default_target: default_target.into(),
        }
    }

    /// Convenience constructor for cookie-based routing.
    pub fn cookie(name: impl Into<String>, default_target: impl Into<String>) -> Self {
        Self {
            selector_kind: Some(SelectorKind::Cookie),
            ..Self::header(name, default_target)
        }
    }

    /// Append a `pattern → target` route.
    pub fn route(mut self, pattern: impl Into<String>, target: impl Into<String>) -> Self {
        self.routes.push((pattern.into(), target.into()));
        self
    }
}

/// One compiled route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: String,
    compiled: Regex,
    raw_target: String,
    target: Url,
}

impl RouteEntry {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// The target string exactly as configured.
    pub fn raw_target(&self) -> &str {
        &self.raw_target
    }

    /// Unanchored match against a decoded discriminator value.
    pub fn matches(&self, value: &str) -> bool {
        self.compiled.is_match(value)
    }
}

/// Immutable, compiled routing state.
#[derive(Debug, Clone)]
pub struct RouteTable {
    selector: Selector,
    entries: Vec<RouteEntry>,
    default_target: Url,
}

impl RouteTable {
    /// Validate and compile a route definition.
    ///
    /// Patterns are unique keys: when the same pattern is configured twice the
    /// later target replaces the earlier one.
    pub fn build(def: RouteDefinition) -> Result<Self, RouteTableError> {
        let kind = def.selector_kind.ok_or(RouteTableError::MissingSelectorType)?;
        if def.selector_name.is_empty() {
            return Err(RouteTableError::MissingSelectorName);
        }

        let mut parsed = Vec::with_capacity(def.routes.len());
        for (pattern, target) in def.routes {
            let url = parse_target(&target)?;
            parsed.push((pattern, target, url));
        }

        // Reuse an entry's URL when its raw target is byte-identical to the default.
        let default_target = match parsed.iter().find(|(_, raw, _)| *raw == def.default_target) {
            Some((_, _, url)) => url.clone(),
            None => parse_target(&def.default_target)?,
        };

        let mut entries: Vec<RouteEntry> = Vec::with_capacity(parsed.len());
        for (pattern, raw_target, target) in parsed {
            let compiled = compile_pattern(&pattern)?;
            let entry = RouteEntry {
                pattern,
                compiled,
                raw_target,
                target,
            };
            match entries.iter_mut().find(|e| e.pattern == entry.pattern) {
                Some(existing) => {
                    tracing::warn!(
                        pattern = %entry.pattern,
                        previous = %existing.raw_target,
                        target = %entry.raw_target,
                        "Duplicate route pattern, later target wins"
                    );
                    *existing = entry;
                }
                None => entries.push(entry),
            }
        }

        Ok(Self {
            selector: Selector::new(kind, def.selector_name),
            entries,
            default_target,
        })
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn default_target(&self) -> &Url {
        &self.default_target
    }
}

fn parse_target(target: &str) -> Result<Url, RouteTableError> {
    let invalid = |reason: String| RouteTableError::InvalidTargetUrl {
        target: target.to_string(),
        reason,
    };
    let url = Url::parse(target).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(invalid("target must be an absolute URL with a host".to_string()));
    }
    Ok(url)
}
