//! Upstream request rewriting.
//!
//! # Responsibilities
//! - Point the request URI at the target (scheme + authority replaced)
//! - Join the target path and the request path with exactly one `/`
//! - Merge target and request query strings
//! - Strip hop-by-hop headers and record the client in `X-Forwarded-For`

use std::net::IpAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Uri};
use url::{Position, Url};

use crate::proxy::forwarder::ForwardError;

/// Headers that only make sense for a single transport-level connection.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Build the upstream URI for `uri` when forwarding to `target`.
pub fn rewrite_uri(target: &Url, uri: &Uri) -> Result<Uri, ForwardError> {
    let authority = &target[Position::BeforeHost..Position::AfterPort];
    let path = join_paths(target.path(), uri.path());

    let query = match (target.query().unwrap_or(""), uri.query().unwrap_or("")) {
        ("", "") => String::new(),
        (t, "") => format!("?{t}"),
        ("", r) => format!("?{r}"),
        (t, r) => format!("?{t}&{r}"),
    };

    let rewritten = format!("{}://{}{}{}", target.scheme(), authority, path, query);
    rewritten
        .parse::<Uri>()
        .map_err(|e| ForwardError::InvalidUri(format!("{rewritten}: {e}")))
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Append `client` to `X-Forwarded-For`, keeping any earlier hops.
pub fn append_forwarded_for(headers: &mut HeaderMap, client: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client.to_string()
    } else {
        format!("{}, {}", prior.join(", "), client)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
