//! Query string parsing.
//!
//! Values are kept raw: no percent-decoding and no validation. A key without
//! `=` maps to `None`; when a key repeats, the last occurrence wins.

use std::collections::HashMap;

/// Parsed query parameters.
pub type QueryParams = HashMap<String, Option<String>>;

/// Parse a raw query string such as `?search=Diego&page=2`.
pub fn parse_query(raw: &str) -> QueryParams {
    raw.strip_prefix('?')
        .unwrap_or(raw)
        .split('&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| match piece.split_once('=') {
            Some((key, value)) => (key.to_string(), Some(value.to_string())),
            None => (piece.to_string(), None),
        })
        .collect()
}
