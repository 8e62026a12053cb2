//! Route lookup and dispatch decision.
//!
//! # Responsibilities
//! - Extract the discriminator for a request
//! - Match it against every compiled pattern
//! - Return all matched targets, or the default target when nothing matched
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Every matching route is returned, not just the first one (fan-out)
//! - Explicit matches suppress the default target entirely
//! - The router carries its own span; events are logged under it rather than
//!   under whatever span happens to be current

use axum::http::HeaderMap;
use tracing::Span;
use url::Url;

use crate::routing::extractor::{self, ExtractError};
use crate::routing::table::{RouteEntry, RouteTable};

/// Outcome of matching one discriminator value.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// One or more patterns matched.
    Matched(Vec<&'a RouteEntry>),
    /// Nothing matched; the default target applies.
    Default(&'a Url),
}

impl<'a> Resolution<'a> {
    /// Targets to forward to, in forwarding order.
    pub fn targets(&self) -> Vec<&'a Url> {
        match self {
            Resolution::Matched(entries) => entries.iter().map(|&e| e.target()).collect(),
            Resolution::Default(url) => vec![*url],
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Resolution::Default(_))
    }
}

/// The routing decision engine.
#[derive(Debug)]
pub struct Router {
    table: RouteTable,
    span: Span,
}

impl Router {
    /// Create a router over `table`, logging under `span`.
    pub fn new(table: RouteTable, span: Span) -> Self {
        Self { table, span }
    }

    /// Create a router with a span describing its selector.
    pub fn with_default_span(table: RouteTable) -> Self {
        let span = tracing::info_span!(
            "router",
            selector = %table.selector().name(),
            kind = %table.selector().kind(),
        );
        Self::new(table, span)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Extract and decode the discriminator carried by `headers`.
    pub fn discriminator(&self, headers: &HeaderMap) -> Result<String, ExtractError> {
        let selector = self.table.selector();
        match extractor::discriminator(headers, selector) {
            Ok(value) => {
                tracing::debug!(
                    parent: &self.span,
                    "[{}] received selector {} to serve",
                    selector.name(),
                    value
                );
                Ok(value)
            }
            Err(e) => {
                tracing::error!(parent: &self.span, error = %e, "failed to get selector value");
                Err(e)
            }
        }
    }

    /// Every route whose pattern matches `value`.
    pub fn matching_entries(&self, value: &str) -> Vec<&RouteEntry> {
        self.table.entries().iter().filter(|e| e.matches(value)).collect()
    }

    /// Resolve `value` to the targets that should receive the request.
    pub fn resolve(&self, value: &str) -> Resolution<'_> {
        let matched = self.matching_entries(value);
        let resolution = if matched.is_empty() {
            Resolution::Default(self.table.default_target())
        } else {
            Resolution::Matched(matched)
        };

        for target in resolution.targets() {
            tracing::debug!(parent: &self.span, "sending {} to target {}...", value, target);
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::RouteDefinition;
    use std::collections::HashSet;

    fn router() -> Router {
        let def = RouteDefinition::header("x-user", "http://t0.test")
            .route("k.[l]+.+", "http://t1.test")
            .route("k.*t", "http://t2.test")
            .route("e.+a", "http://t3.test");
        Router::with_default_span(RouteTable::build(def).unwrap())
    }

    fn hosts(resolution: &Resolution<'_>) -> HashSet<String> {
        resolution
            .targets()
            .iter()
            .filter_map(|u| u.host_str().map(str::to_string))
            .collect()
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_matches() {
        let router = router();
        assert_eq!(hosts(&router.resolve("kabat")), set(&["t2.test"]));
        assert_eq!(hosts(&router.resolve("kasdft")), set(&["t2.test"]));
        assert_eq!(hosts(&router.resolve("kalap")), set(&["t1.test"]));
        assert_eq!(hosts(&router.resolve("ebola")), set(&["t3.test"]));
    }

    #[test]
    fn no_match_falls_back_to_default() {
        let router = router();
        let resolution = router.resolve("zzz");
        assert!(resolution.is_default());
        assert_eq!(hosts(&resolution), set(&["t0.test"]));
        assert!(router.resolve("").is_default());
    }

    #[test]
    fn every_match_is_returned() {
        let router = router();
        // "kalapket" matches both k.[l]+.+ and k.*t
        let resolution = router.resolve("kalapket");
        assert!(!resolution.is_default());
        assert_eq!(hosts(&resolution), set(&["t1.test", "t2.test"]));
    }

    #[test]
    fn default_suppressed_even_when_it_is_a_match_target() {
        let def = RouteDefinition::header("x-user", "http://t0.test")
            .route("kalap", "http://t0.test")
            .route("kal", "http://t1.test");
        let router = Router::with_default_span(RouteTable::build(def).unwrap());
        let targets = router.resolve("kalap").targets();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn plain_key_matching() {
        let def = RouteDefinition::header("x-user", "http://t0.test")
            .route("kalap", "http://csuka.test")
            .route("kabat", "http://ponty.test");
        let router = Router::with_default_span(RouteTable::build(def).unwrap());
        let patterns: Vec<_> = router.matching_entries("kalap").iter().map(|e| e.pattern()).collect();
        assert_eq!(patterns, vec!["kalap"]);
    }

    #[test]
    fn patterned_key_matching() {
        let def = RouteDefinition::header("x-user", "http://t0.test")
            .route("k.[l]+.+", "http://csuka.test")
            .route("ka.at", "http://ponty.test");
        let router = Router::with_default_span(RouteTable::build(def).unwrap());
        let patterns: Vec<_> = router.matching_entries("kalap").iter().map(|e| e.pattern()).collect();
        assert_eq!(patterns, vec!["k.[l]+.+"]);
    }

    #[test]
    fn resolution_is_repeatable() {
        let router = router();
        for _ in 0..3 {
            assert_eq!(hosts(&router.resolve("kalap")), set(&["t1.test"]));
        }
    }

    #[test]
    fn discriminator_uses_selector() {
        let router = router();
        let mut headers = HeaderMap::new();
        headers.insert("x-user", "ka%6Cap".parse().unwrap());
        assert_eq!(router.discriminator(&headers).unwrap(), "kalap");

        headers.insert("x-user", "ka%6".parse().unwrap());
        assert!(router.discriminator(&headers).is_err());
    }
}
