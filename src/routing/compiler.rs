//! Selector pattern compilation.
//!
//! # Design Decisions
//! - Patterns are plain `regex` expressions compiled once at startup
//! - Matching is unanchored: a pattern matches if it occurs anywhere in the
//!   discriminator value. Operators who need full-string matching write `^...$`
//! - A pattern that fails to compile aborts route table construction

use regex::Regex;

use crate::routing::table::RouteTableError;

/// Compile a configured pattern into a reusable matcher.
pub fn compile_pattern(pattern: &str) -> Result<Regex, RouteTableError> {
    Regex::new(pattern).map_err(|e| RouteTableError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_pattern_matches_substrings() {
        let re = compile_pattern("kalap").unwrap();
        assert!(re.is_match("kalap"));
        assert!(re.is_match("szalmakalapos"));
        assert!(!re.is_match("kabat"));
    }

    #[test]
    fn class_pattern_matches() {
        let re = compile_pattern("k.[l]+.+").unwrap();
        assert!(re.is_match("kalap"));
        assert!(!re.is_match("kabat"));
    }

    #[test]
    fn anchors_are_honoured() {
        let re = compile_pattern("^kalap$").unwrap();
        assert!(re.is_match("kalap"));
        assert!(!re.is_match("kalapos"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = compile_pattern("k(alap").unwrap_err();
        match err {
            RouteTableError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "k(alap"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
