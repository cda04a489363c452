//! HTTP response building module
//!
//! Builders for the status codes the asset pipeline produces, decoupled
//! from resolution logic. Clients only ever see these shapes; resolution
//! failures never surface as 5xx.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::logger;

/// Headers shared by 200 and 206 asset responses.
pub struct ResponseMeta<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: &'a str,
    /// Configured literal, emitted verbatim when present.
    pub cache_control: Option<&'a str>,
    /// Advertise `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// HEAD request - full headers, empty body.
    pub is_head: bool,
}

/// Build 200 OK response for a full asset payload
pub fn build_asset_response(meta: &ResponseMeta<'_>, body: Bytes) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let payload = if meta.is_head { Bytes::new() } else { body };

    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", meta.content_type)
        .header("Content-Length", content_length)
        .header("ETag", meta.etag)
        .header("Last-Modified", meta.last_modified);
    if meta.accept_ranges {
        builder = builder.header("Accept-Ranges", "bytes");
    }
    if let Some(cache_control) = meta.cache_control {
        builder = builder.header("Cache-Control", cache_control);
    }

    builder.body(Full::new(payload)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 206 Partial Content response
///
/// `content_range` carries the already-formatted ranges in header order,
/// e.g. `bytes 0-0,10-10/11`; `body` is the matching concatenation of the
/// requested byte windows.
pub fn build_partial_response(
    meta: &ResponseMeta<'_>,
    content_range: &str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let payload = if meta.is_head { Bytes::new() } else { body };

    let mut builder = Response::builder()
        .status(206)
        .header("Content-Type", meta.content_type)
        .header("Content-Length", content_length)
        .header("Content-Range", content_range)
        .header("Accept-Ranges", "bytes")
        .header("ETag", meta.etag)
        .header("Last-Modified", meta.last_modified);
    if let Some(cache_control) = meta.cache_control {
        builder = builder.header("Cache-Control", cache_control);
    }

    builder.body(Full::new(payload)).unwrap_or_else(|e| {
        log_build_error("206", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache_control: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(304).header("ETag", etag);
    if let Some(cache_control) = cache_control {
        builder = builder.header("Cache-Control", cache_control);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(length: usize) -> Response<Full<Bytes>> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{length}"))
        .body(Full::new(Bytes::from("Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::from("Range Not Satisfiable")))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
