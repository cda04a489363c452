//! Asset serving module
//!
//! The per-request protocol state machine: resolve through the cache,
//! short-circuit on client-side freshness, then answer with full content,
//! the requested byte windows, or the matching error status. Nothing in
//! here can produce a status outside 200/206/304/404/416.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::handler::RequestContext;
use crate::http::conditional;
use crate::http::mime;
use crate::http::range::{parse_range_header, ByteRange};
use crate::http::response::{self, ResponseMeta};

/// Serve the asset for an already-decoded request path.
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let Some(asset) = state.assets.get(ctx.path).await else {
        return response::build_404_response();
    };
    let snapshot = asset.snapshot().await;

    if conditional::is_cached_client_side(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
        &snapshot.etag,
        snapshot.last_modified_ms,
    ) {
        return response::build_304_response(&snapshot.etag, state.cache_control.as_deref());
    }

    let content_type = state.content_types.resolve(ctx.path);
    let last_modified = conditional::format_http_date(snapshot.last_modified_ms);
    let length = snapshot.bytes.len();

    let ranges = match requested_ranges(ctx, &snapshot.etag, length) {
        RangeDecision::Full => None,
        RangeDecision::Invalid => return response::build_416_response(length),
        RangeDecision::Partial(ranges) => Some(ranges),
    };

    let meta = ResponseMeta {
        content_type: &content_type,
        etag: &snapshot.etag,
        last_modified: &last_modified,
        cache_control: state.cache_control.as_deref(),
        accept_ranges: mime::accepts_ranges(&content_type) || ranges.is_some(),
        is_head: ctx.is_head,
    };

    match ranges {
        Some(ranges) => {
            let content_range = format_content_range(&ranges, length);
            let body = concat_windows(&snapshot.bytes, &ranges);
            response::build_partial_response(&meta, &content_range, body)
        }
        None => response::build_asset_response(&meta, snapshot.bytes.clone()),
    }
}

enum RangeDecision {
    /// No usable range request - serve the whole payload.
    Full,
    /// Malformed or unsatisfiable header - 416.
    Invalid,
    Partial(Vec<ByteRange>),
}

/// Decide how the `Range` header applies to this asset.
///
/// An `If-Range` validator that no longer matches the current ETag means
/// the client's range offsets refer to stale content; the ranges are
/// ignored and the full payload is sent instead.
fn requested_ranges(ctx: &RequestContext<'_>, etag: &str, length: usize) -> RangeDecision {
    let Some(header) = ctx.range.as_deref() else {
        return RangeDecision::Full;
    };
    if let Some(if_range) = ctx.if_range.as_deref() {
        if if_range != etag {
            return RangeDecision::Full;
        }
    }
    match parse_range_header(header, length) {
        Ok(ranges) => RangeDecision::Partial(ranges),
        Err(_) => RangeDecision::Invalid,
    }
}

/// `Content-Range` value listing every range in header order, e.g.
/// `bytes 0-0,10-10/11`.
fn format_content_range(ranges: &[ByteRange], length: usize) -> String {
    let list = ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("bytes {list}/{length}")
}

/// Concatenation of the requested byte windows in header order.
fn concat_windows(bytes: &Bytes, ranges: &[ByteRange]) -> Bytes {
    let total: usize = ranges.iter().map(ByteRange::length).sum();
    let mut body = Vec::with_capacity(total);
    for range in ranges {
        body.extend_from_slice(&bytes[range.start..=range.end]);
    }
    Bytes::from(body)
}
