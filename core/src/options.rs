//! Request options derived from a call descriptor.

use crate::action::is_truthy;
use crate::descriptor::CallApi;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Credentials policy used when the descriptor names none.
pub const DEFAULT_CREDENTIALS: &str = "same-origin";

/// Method used when the descriptor names none.
pub const DEFAULT_METHOD: &str = "GET";

/// Value of the `accept` and `Content-Type` headers for JSON bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Headers forced to [`JSON_MEDIA_TYPE`] when the body is JSON.
const JSON_HEADERS: [&str; 2] = ["accept", "Content-Type"];

/// Concrete options handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOptions {
    /// Credentials policy (`same-origin`, `include`, `omit`)
    pub credentials: String,
    /// Uppercased HTTP method
    pub method: String,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Serialized request body
    pub body: Option<String>,
    /// Query parameters, kept for the URL serializer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            credentials: DEFAULT_CREDENTIALS.to_string(),
            method: DEFAULT_METHOD.to_string(),
            headers: BTreeMap::new(),
            body: None,
            query: None,
        }
    }
}

impl FetchOptions {
    /// Override fields with those present in `patch`.
    ///
    /// Each present field replaces the current value wholesale; headers are not
    /// merged key by key.
    pub fn apply(&mut self, patch: FetchOptionsPatch) {
        let FetchOptionsPatch {
            credentials,
            method,
            headers,
            body,
            query,
        } = patch;

        if let Some(credentials) = credentials {
            self.credentials = credentials;
        }
        if let Some(method) = method {
            self.method = method;
        }
        if let Some(headers) = headers {
            self.headers = headers;
        }
        if let Some(body) = body {
            self.body = Some(body);
        }
        if let Some(query) = query {
            self.query = Some(query);
        }
    }
}

/// Partial [`FetchOptions`] returned by a `before` hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptionsPatch {
    /// Replacement credentials policy
    pub credentials: Option<String>,
    /// Replacement method
    pub method: Option<String>,
    /// Replacement header set
    pub headers: Option<BTreeMap<String, String>>,
    /// Replacement body
    pub body: Option<String>,
    /// Replacement query
    pub query: Option<Map<String, Value>>,
}

impl FetchOptionsPatch {
    /// Replace the header set
    #[must_use]
    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Replace the method
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Replace the credentials policy
    #[must_use]
    pub fn credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Replace the body
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Build the [`FetchOptions`] for a descriptor.
///
/// Rules, applied in order:
///
/// 1. `credentials` is copied, else `same-origin`
/// 2. descriptor headers are copied
/// 3. truthy `data` becomes the body
/// 4. an object, array or string body is JSON-encoded and forces the
///    `accept` / `Content-Type: application/json` headers
/// 5. `method` is uppercased, else `GET`
/// 6. `query` is copied
///
/// Extra transformation stages on the descriptor are not part of the options.
#[must_use]
pub fn serialize_options(call: &CallApi) -> FetchOptions {
    let mut options = FetchOptions::default();

    if let Some(credentials) = &call.credentials {
        options.credentials.clone_from(credentials);
    }

    options.headers.extend(
        call.headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    match call.data.as_ref().filter(|data| is_truthy(data)) {
        Some(data @ (Value::Object(_) | Value::Array(_) | Value::String(_))) => {
            options.body = Some(data.to_string());
            // Header names are case-insensitive on the wire
            options.headers.retain(|name, _| {
                !JSON_HEADERS
                    .iter()
                    .any(|json_header| name.eq_ignore_ascii_case(json_header))
            });
            for name in JSON_HEADERS {
                options
                    .headers
                    .insert(name.to_string(), JSON_MEDIA_TYPE.to_string());
            }
        },
        Some(scalar) => options.body = Some(scalar.to_string()),
        None => {},
    }

    options.method = call
        .method
        .as_deref()
        .map_or_else(|| DEFAULT_METHOD.to_string(), str::to_uppercase);

    options.query.clone_from(&call.query);

    options
}
