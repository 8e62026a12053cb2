//! Upstream forwarding.
//!
//! # Data Flow
//! ```text
//! (target URL, inbound request)
//!     → rewrite.rs (URI, hop-by-hop headers, X-Forwarded-For)
//!     → forwarder.rs (pooled hyper client)
//!     → upstream response, streamed back
//! ```

pub mod forwarder;
pub mod rewrite;

pub use forwarder::{ForwardError, Forwarder, HttpForwarder};
