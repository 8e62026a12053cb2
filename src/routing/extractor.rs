//! Discriminator extraction.
//!
//! # Responsibilities
//! - Read the configured header or cookie from the inbound request
//! - Treat an absent header/cookie as the empty discriminator
//! - Percent-decode the raw value (query unescaping, `+` is a space)
//!
//! # Design Decisions
//! - Header values are read byte-for-byte (lossy UTF-8), never rejected
//! - Cookies follow the usual `name=value; name2=value2` grammar over raw
//!   bytes; a value wrapped in double quotes is unwrapped, and pairs with
//!   illegal value bytes are skipped without touching the others
//! - A malformed `%` escape fails the request instead of routing on garbage;
//!   well-formed escapes that decode to non-UTF-8 bytes are decoded lossily

use axum::http::{header::COOKIE, HeaderMap};
use thiserror::Error;

use crate::routing::selector::{Selector, SelectorKind};

/// Per-request extraction failure. Never fatal for the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("invalid URL escape in {0:?}")]
    Decode(String),
}

/// Extract and decode the discriminator for `selector` from `headers`.
pub fn discriminator(headers: &HeaderMap, selector: &Selector) -> Result<String, ExtractError> {
    query_unescape(&extract_raw(headers, selector))
}

/// Extract the raw (still escaped) discriminator. Absent means empty.
pub fn extract_raw(headers: &HeaderMap, selector: &Selector) -> String {
    match selector.kind() {
        SelectorKind::Header => headers
            .get(selector.name())
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default(),
        SelectorKind::Cookie => find_cookie(headers, selector.name()).unwrap_or_default(),
    }
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .flat_map(|line| line.as_bytes().split(|&b| b == b';'))
        .filter_map(|pair| {
            let pair = pair.trim_ascii();
            let (key, value) = match pair.iter().position(|&b| b == b'=') {
                Some(idx) => (&pair[..idx], &pair[idx + 1..]),
                None => (pair, &b""[..]),
            };
            if key.trim_ascii() != name.as_bytes() {
                return None;
            }
            cookie_value(value)
        })
        .next()
}

fn cookie_value(raw: &[u8]) -> Option<String> {
    let value = raw
        .strip_prefix(b"\"")
        .and_then(|v| v.strip_suffix(b"\""))
        .unwrap_or(raw);
    if !value.iter().copied().all(is_cookie_value_byte) {
        return None;
    }
    String::from_utf8(value.to_vec()).ok()
}

fn is_cookie_value_byte(b: u8) -> bool {
    (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\'
}

/// Query-style unescape: `+` becomes a space and `%XX` becomes the byte `XX`.
///
/// Every `%` must be followed by two hex digits. Decoded bytes that are not
/// UTF-8 are replaced, so such values still route.
pub fn query_unescape(raw: &str) -> Result<String, ExtractError> {
    let mut rest = raw;
    while let Some(idx) = rest.find('%') {
        match rest.get(idx + 1..idx + 3) {
            Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => rest = &rest[idx + 3..],
            _ => return Err(ExtractError::Decode(raw.to_string())),
        }
    }

    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn header_selector() -> Selector {
        Selector::new(SelectorKind::Header, "x-user")
    }

    fn cookie_selector() -> Selector {
        Selector::new(SelectorKind::Cookie, "x-user-hint")
    }

    #[test]
    fn header_present() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static("kalap"));
        assert_eq!(discriminator(&headers, &header_selector()).unwrap(), "kalap");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static("kabat"));
        let selector = Selector::new(SelectorKind::Header, "X-USER");
        assert_eq!(discriminator(&headers, &selector).unwrap(), "kabat");
    }

    #[test]
    fn absent_header_is_empty() {
        let headers = HeaderMap::new();
        assert_eq!(discriminator(&headers, &header_selector()).unwrap(), "");
    }

    #[test]
    fn cookie_present_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=abc; x-user-hint=ebola; theme=dark"));
        assert_eq!(discriminator(&headers, &cookie_selector()).unwrap(), "ebola");
    }

    #[test]
    fn cookie_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("session=abc"));
        headers.append(COOKIE, HeaderValue::from_static("x-user-hint=kabat"));
        assert_eq!(discriminator(&headers, &cookie_selector()).unwrap(), "kabat");
    }

    #[test]
    fn quoted_cookie_is_unwrapped() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("x-user-hint=\"kalap\""));
        assert_eq!(discriminator(&headers, &cookie_selector()).unwrap(), "kalap");
    }

    #[test]
    fn absent_cookie_is_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=abc"));
        assert_eq!(discriminator(&headers, &cookie_selector()).unwrap(), "");
        assert_eq!(discriminator(&HeaderMap::new(), &cookie_selector()).unwrap(), "");
    }

    #[test]
    fn unrelated_non_ascii_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_bytes("theme=café; x-user-hint=kalap".as_bytes()).unwrap());
        assert_eq!(discriminator(&headers, &cookie_selector()).unwrap(), "kalap");
    }

    #[test]
    fn cookie_with_illegal_bytes_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_bytes(b"x-user-hint=\xff").unwrap());
        assert_eq!(discriminator(&headers, &cookie_selector()).unwrap(), "");

        headers.insert(COOKIE, HeaderValue::from_bytes(b"x-user-hint=a\\b; x-user-hint=kabat").unwrap());
        assert_eq!(discriminator(&headers, &cookie_selector()).unwrap(), "kabat");
    }

    #[test]
    fn value_is_percent_decoded() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static("k%C3%A1l+ap%2B"));
        assert_eq!(discriminator(&headers, &header_selector()).unwrap(), "kál ap+");
    }

    #[test]
    fn malformed_escape_fails() {
        assert_eq!(query_unescape("ka%zzlap").unwrap_err(), ExtractError::Decode("ka%zzlap".into()));
        assert!(query_unescape("kalap%").is_err());
        assert!(query_unescape("kalap%4").is_err());
    }

    #[test]
    fn non_utf8_escape_still_decodes() {
        assert_eq!(query_unescape("kalap%ff").unwrap(), "kalap\u{FFFD}");
        assert!(query_unescape("%ff").is_ok());
    }
}
