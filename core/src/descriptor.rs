//! Call descriptors: the declarative description of one API call.

use crate::action::{Payload, empty_object, is_truthy};
use crate::chain::{Stage, Transformer, transformer};
use crate::environment::Dispatch;
use crate::fetch_data::FetchData;
use crate::options::{FetchOptions, FetchOptionsPatch};
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Runs before the request is sent; a returned patch overrides the options.
///
/// The hook may dispatch through the handle it is given; the middleware awaits
/// the returned future before sending the request.
pub type BeforeHook = Arc<
    dyn for<'a> Fn(&'a FetchOptions, &'a dyn Dispatch) -> BoxFuture<'a, Option<FetchOptionsPatch>>
        + Send
        + Sync,
>;

/// Decides whether a resolved payload is a logical failure.
///
/// Returning a truthy reason fails the call with that reason as the payload.
pub type IsSuccessHook = Arc<dyn Fn(&Payload) -> Option<Value> + Send + Sync>;

/// Observes the full pipeline result of a successful call.
pub type SuccessHook = Arc<dyn Fn(&FetchData) + Send + Sync>;

/// Observes the reason or error of a failed call.
pub type FailureHook = Arc<dyn Fn(&Payload) + Send + Sync>;

/// Descriptor of one API call.
///
/// Built with [`CallApi::new`] and the `with_*` methods, or parsed from JSON with
/// [`CallApi::from_value`] (hooks and stages can only be attached in code).
///
/// # Example
///
/// ```
/// use call_api_core::descriptor::CallApi;
/// use serde_json::json;
///
/// let call = CallApi::new("http://api.example.com/user")
///     .with_types(["USER_REQUEST", "USER_SUCCESS", "USER_FAILURE"])
///     .with_method("post")
///     .with_data(json!({"name": "Abram"}))
///     .with_meta(json!({"form": "signup"}));
///
/// assert_eq!(call.types.len(), 3);
/// ```
#[derive(Clone, Default)]
pub struct CallApi {
    /// Endpoint; a descriptor without one is not handled
    pub url: String,
    /// Request, success and failure action types
    pub types: Vec<String>,
    /// HTTP method, `GET` when absent
    pub method: Option<String>,
    /// Request body; also the payload of the request action
    pub data: Option<Value>,
    /// Query parameters
    pub query: Option<Map<String, Value>>,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Credentials policy, `same-origin` when absent
    pub credentials: Option<String>,
    /// Metadata attached to every emitted action
    pub meta: Option<Value>,
    /// Static success payload; when truthy no request is made
    pub cached: Option<Value>,
    /// Per-call options hook
    pub before: Option<BeforeHook>,
    /// Per-call success observer
    pub success: Option<SuccessHook>,
    /// Per-call failure observer
    pub failure: Option<FailureHook>,
    /// Per-call logical success check
    pub is_success: Option<IsSuccessHook>,
    /// Stages run after the built-in response stages
    pub middlewares: Vec<Stage<FetchData>>,
}

impl fmt::Debug for CallApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallApi")
            .field("url", &self.url)
            .field("types", &self.types)
            .field("method", &self.method)
            .field("data", &self.data)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("credentials", &self.credentials)
            .field("meta", &self.meta)
            .field("cached", &self.cached)
            .field("before", &self.before.is_some())
            .field("success", &self.success.is_some())
            .field("failure", &self.failure.is_some())
            .field("is_success", &self.is_success.is_some())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

impl CallApi {
    /// Describe a call to `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Parse the data fields of a JSON descriptor.
    ///
    /// Fields of the wrong shape are dropped. A `types` value that is not a list
    /// of strings is kept as an empty list, which fails validation.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let types = value
            .get("types")
            .and_then(Value::as_array)
            .and_then(|types| {
                types
                    .iter()
                    .map(|t| t.as_str().map(ToString::to_string))
                    .collect::<Option<Vec<_>>>()
            })
            .unwrap_or_default();

        let headers = value
            .get("headers")
            .and_then(Value::as_object)
            .map(|headers| {
                headers
                    .iter()
                    .filter_map(|(name, value)| match value {
                        Value::String(text) => Some((name.clone(), text.clone())),
                        Value::Number(_) | Value::Bool(_) => Some((name.clone(), value.to_string())),
                        Value::Null | Value::Array(_) | Value::Object(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            url: value
                .get("url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            types,
            method: value.get("method").and_then(Value::as_str).map(ToString::to_string),
            data: value.get("data").cloned(),
            query: value.get("query").and_then(Value::as_object).cloned(),
            headers,
            credentials: value
                .get("credentials")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            meta: value.get("meta").cloned(),
            cached: value.get("cached").cloned(),
            ..Self::default()
        }
    }

    /// Set the request, success and failure action types
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the HTTP method (case-insensitive)
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the request body
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the query parameters; non-object values are ignored
    #[must_use]
    pub fn with_query(mut self, query: Value) -> Self {
        if let Value::Object(query) = query {
            self.query = Some(query);
        }
        self
    }

    /// Add a request header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the credentials policy
    #[must_use]
    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Set the metadata attached to every emitted action
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Answer with a static payload instead of calling the server
    #[must_use]
    pub fn with_cached(mut self, cached: Value) -> Self {
        self.cached = Some(cached);
        self
    }

    /// Adjust the request options before sending
    #[must_use]
    pub fn with_before<F>(mut self, before: F) -> Self
    where
        F: for<'a> Fn(&'a FetchOptions, &'a dyn Dispatch) -> BoxFuture<'a, Option<FetchOptionsPatch>>
            + Send
            + Sync
            + 'static,
    {
        self.before = Some(Arc::new(before));
        self
    }

    /// Observe successful calls
    #[must_use]
    pub fn with_success<F>(mut self, success: F) -> Self
    where
        F: Fn(&FetchData) + Send + Sync + 'static,
    {
        self.success = Some(Arc::new(success));
        self
    }

    /// Observe failed calls
    #[must_use]
    pub fn with_failure<F>(mut self, failure: F) -> Self
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.failure = Some(Arc::new(failure));
        self
    }

    /// Check resolved payloads for logical failures
    #[must_use]
    pub fn with_is_success<F>(mut self, is_success: F) -> Self
    where
        F: Fn(&Payload) -> Option<Value> + Send + Sync + 'static,
    {
        self.is_success = Some(Arc::new(is_success));
        self
    }

    /// Append an async stage after the built-in response stages
    #[must_use]
    pub fn with_middleware<F, Fut>(self, middleware: F) -> Self
    where
        F: Fn(FetchData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchData> + Send + 'static,
    {
        self.with_stage(Some(transformer(middleware)))
    }

    /// Append a stage as is; `None` is a placeholder that is skipped
    #[must_use]
    pub fn with_stage(mut self, stage: Option<Transformer<FetchData>>) -> Self {
        self.middlewares.push(stage);
        self
    }

    /// Payload of the request action: truthy `data`, else `{}`
    #[must_use]
    pub fn request_payload(&self) -> Payload {
        self.data
            .as_ref()
            .filter(|data| is_truthy(data))
            .map_or_else(Payload::default, |data| Payload::Json(data.clone()))
    }

    /// Metadata of every emitted action: truthy `meta`, else `{}`
    #[must_use]
    pub fn meta_or_default(&self) -> Value {
        self.meta
            .as_ref()
            .filter(|meta| is_truthy(meta))
            .map_or_else(empty_object, Clone::clone)
    }

    /// The cached payload, if one short-circuits the call
    #[must_use]
    pub fn cached_payload(&self) -> Option<Payload> {
        self.cached
            .as_ref()
            .filter(|cached| is_truthy(cached))
            .map(|cached| Payload::Json(cached.clone()))
    }

    /// Resolve the optional result hooks to always-callable functions
    #[must_use]
    pub fn resolve_hooks(&self) -> Hooks {
        let defaults = Hooks::default();
        Hooks {
            is_success: self.is_success.clone().unwrap_or(defaults.is_success),
            success: self.success.clone().unwrap_or(defaults.success),
            failure: self.failure.clone().unwrap_or(defaults.failure),
        }
    }
}

/// Result hooks of a call with absent hooks replaced by no-ops.
#[derive(Clone)]
pub struct Hooks {
    /// Logical success check; the default reports no failure
    pub is_success: IsSuccessHook,
    /// Success observer; the default does nothing
    pub success: SuccessHook,
    /// Failure observer; the default does nothing
    pub failure: FailureHook,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            is_success: Arc::new(|_: &Payload| None),
            success: Arc::new(|_: &FetchData| {}),
            failure: Arc::new(|_: &Payload| {}),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn from_value_reads_data_fields() {
        let call = CallApi::from_value(&json!({
            "url": "http://api.redux-api.com/user",
            "types": ["request", "success", "failure"],
            "method": "post",
            "data": {"id": 1},
            "query": {"a": 1},
            "headers": {"x-as-from": "node-call", "x-retry": 2, "x-bad": null},
            "credentials": "include",
            "meta": {"page": 1},
            "cached": {"author": "Abram"}
        }));

        assert_eq!(call.url, "http://api.redux-api.com/user");
        assert_eq!(call.types, vec!["request", "success", "failure"]);
        assert_eq!(call.method.as_deref(), Some("post"));
        assert_eq!(call.data, Some(json!({"id": 1})));
        assert_eq!(call.query, json!({"a": 1}).as_object().cloned());
        assert_eq!(call.headers.len(), 2);
        assert_eq!(call.headers["x-retry"], "2");
        assert_eq!(call.credentials.as_deref(), Some("include"));
        assert_eq!(call.meta_or_default(), json!({"page": 1}));
        assert_eq!(call.cached_payload(), Some(Payload::Json(json!({"author": "Abram"}))));
    }

    #[test]
    fn from_value_drops_non_string_types() {
        let call = CallApi::from_value(&json!({"url": "u", "types": ["a", 2, "c"]}));
        assert!(call.types.is_empty());
    }

    #[test]
    fn defaults_for_payload_and_meta() {
        let call = CallApi::new("u").with_data(json!(0)).with_meta(Value::Null);
        assert_eq!(call.request_payload(), Payload::Json(json!({})));
        assert_eq!(call.meta_or_default(), json!({}));
    }

    #[test]
    fn falsy_cache_does_not_short_circuit() {
        assert_eq!(CallApi::new("u").with_cached(json!("")).cached_payload(), None);
        assert_eq!(
            CallApi::new("u").with_cached(json!([])).cached_payload(),
            Some(Payload::Json(json!([])))
        );
    }

    #[test]
    fn resolved_hooks_default_to_no_ops() {
        let hooks = CallApi::new("u").resolve_hooks();
        assert_eq!((hooks.is_success)(&Payload::default()), None);
    }

    #[test]
    fn resolved_hooks_keep_user_functions() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let hooks = CallApi::new("u")
            .with_failure(move |_| flag.store(true, Ordering::SeqCst))
            .with_is_success(|_| Some(json!("nope")))
            .resolve_hooks();

        (hooks.failure)(&Payload::default());

        assert!(called.load(Ordering::SeqCst));
        assert_eq!((hooks.is_success)(&Payload::default()), Some(json!("nope")));
    }

    #[test]
    fn debug_hides_hook_bodies() {
        let call = CallApi::new("u").with_success(|_| {});
        let debug = format!("{call:?}");
        assert!(debug.contains("success: true"));
    }
}
