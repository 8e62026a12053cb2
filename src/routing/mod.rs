//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteDefinition
//!     → table.rs (validate selector, parse targets)
//!     → compiler.rs (compile patterns)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (headers)
//!     → extractor.rs (header or cookie value, percent-decoded)
//!     → router.rs (match against every pattern)
//!     → Return: all matched targets, or the default target
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Regex matching is unanchored
//! - Deterministic: same input always resolves to the same targets

pub mod compiler;
pub mod extractor;
pub mod router;
pub mod selector;
pub mod table;

pub use extractor::ExtractError;
pub use router::{Resolution, Router};
pub use selector::{Selector, SelectorKind};
pub use table::{RouteDefinition, RouteEntry, RouteTable, RouteTableError};
