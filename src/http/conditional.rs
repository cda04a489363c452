//! Conditional request evaluation
//!
//! `If-None-Match` / `If-Modified-Since` checks and HTTP date handling.
//! Either validator matching is enough for a 304: a client that presents a
//! current ETag or a sufficiently recent date already holds the content.

use chrono::{TimeZone, Utc};

/// Check if the client's `If-None-Match` header matches the asset's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Check whether the client's `If-Modified-Since` date covers the asset.
///
/// True when the header parses and its timestamp is at or after the asset's
/// last-modified time. Both sides carry second resolution only, so the
/// asset time is expected to be pre-truncated to a whole second.
pub fn not_modified_since(if_modified_since: Option<&str>, last_modified_ms: i64) -> bool {
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|client_ms| client_ms >= last_modified_ms)
}

/// Combined client-side freshness check - either validator is sufficient.
pub fn is_cached_client_side(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    last_modified_ms: i64,
) -> bool {
    etag_matches(if_none_match, etag) || not_modified_since(if_modified_since, last_modified_ms)
}

/// Parse an HTTP date header value into epoch milliseconds.
///
/// HTTP dates use the RFC 2822 shape with a `GMT` zone; unparseable values
/// are treated as absent.
pub fn parse_http_date(value: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.timestamp_millis())
}

/// Format epoch milliseconds as an HTTP date, e.g.
/// `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(ms: i64) -> String {
    let date = Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now);
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
