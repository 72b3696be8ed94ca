//! Canned responses.

use bytes::Bytes;
use call_api_core::response::Response;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::Value;

/// A response with the given content type and raw body
#[must_use]
pub fn bytes_response(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    Response::new(status, headers, body)
}

/// An `application/json` response
#[must_use]
pub fn json_response(status: StatusCode, body: &Value) -> Response {
    bytes_response(status, "application/json", body.to_string())
}

/// A `text/plain` response
#[must_use]
pub fn text_response(status: StatusCode, body: &str) -> Response {
    bytes_response(status, "text/plain; charset=utf-8", body.to_string())
}
