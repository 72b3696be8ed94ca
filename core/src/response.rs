//! Buffered HTTP responses as seen by the response pipeline.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

/// Content type used when a response carries no `content-type` header.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// How a response body should be read, resolved once from the `content-type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/json` or a `+json` media type
    Json,
    /// Any `text/*` media type; decoded as JSON when possible
    Text,
    /// Anything else; the raw response is carried as the payload
    Other,
}

impl ContentKind {
    /// Classify a `content-type` header value.
    ///
    /// Parameters (`; charset=...`) are ignored and matching is case-insensitive.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" || essence.ends_with("+json") {
            Self::Json
        } else if essence.starts_with("text/") {
            Self::Text
        } else {
            Self::Other
        }
    }
}

/// A transport response with its body already read into memory.
///
/// Buffering keeps [`FetchData`](crate::fetch_data::FetchData) a plain value: every
/// pipeline stage can read the body without consuming it.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    url: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Create a response from its parts
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            url: String::new(),
            status,
            headers,
            body: body.into(),
        }
    }

    /// Record the final URL the response was served from
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Add or replace a header
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// URL the response was served from (empty when unknown)
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP status
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Canonical reason phrase, or `HTTP <code>` for unregistered codes
    #[must_use]
    pub fn status_text(&self) -> String {
        self.status.canonical_reason().map_or_else(
            || format!("HTTP {}", self.status.as_u16()),
            ToString::to_string,
        )
    }

    /// Response headers
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a header, if present and valid UTF-8
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `content-type` header, defaulting to `text/plain`
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// How the body should be read
    #[must_use]
    pub fn content_kind(&self) -> ContentKind {
        ContentKind::from_content_type(self.content_type())
    }

    /// Raw body bytes
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text (invalid UTF-8 is replaced)
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 4)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("status", &self.status.as_u16())?;
        state.serialize_field("statusText", &self.status_text())?;
        state.serialize_field("ok", &self.ok())?;
        state.end()
    }
}
