//! Discriminator selector.
//!
//! A selector names *where* the discriminator value lives on every request:
//! a header or a cookie, plus its name. One router instance uses exactly one
//! selector, so header- and cookie-based discrimination never mix.

use std::fmt;

/// Where the discriminator is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Header,
    Cookie,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorKind::Header => write!(f, "header"),
            SelectorKind::Cookie => write!(f, "cookie"),
        }
    }
}

/// A validated selector: kind plus non-empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    kind: SelectorKind,
    name: String,
}

impl Selector {
    /// Build a selector. Callers are expected to have rejected empty names
    /// already (see `RouteTable::build`).
    pub(crate) fn new(kind: SelectorKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}
