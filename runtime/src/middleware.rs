//! The Call API middleware.
//!
//! Each call descriptor produces one request action followed by exactly one
//! success or failure action:
//!
//! ```text
//! validate ─▶ REQUEST ─▶ cached? ──yes──▶ SUCCESS(cached)
//!                           │
//!                           no
//!                           ▼
//!       options + url ─▶ before hooks ─▶ fetch ─▶ stages ─▶ filter ─▶ SUCCESS | FAILURE
//! ```

use crate::config::MiddlewareConfig;
use crate::metrics::{
    CACHE_HITS_TOTAL, FAILURE_TOTAL, FETCH_DURATION_SECONDS, PASSTHROUGH_TOTAL, REJECTED,
    REQUESTS_TOTAL, SUCCESS_TOTAL,
};
use call_api_core::action::{Action, FluxAction, Payload, is_truthy};
use call_api_core::chain::{Stage, apply_middlewares};
use call_api_core::descriptor::{CallApi, Hooks};
use call_api_core::endpoint::serialize_url;
use call_api_core::environment::{Dispatch, Transport};
use call_api_core::error::MiddlewareError;
use call_api_core::fetch_data::FetchData;
use call_api_core::options::serialize_options;
use call_api_core::pipeline::{default_stages, result_filter};
use call_api_core::validation::{ActionTypes, is_valid_call_api};
use tokio::time::Instant;

/// Middleware that performs the HTTP calls described by [`Action::CallApi`].
///
/// Invocations share nothing but the transport and the config, so one
/// middleware can serve any number of concurrent calls.
///
/// # Example
///
/// ```no_run
/// use call_api_core::action::Action;
/// use call_api_core::descriptor::CallApi;
/// use call_api_core::environment::FnDispatch;
/// use call_api_runtime::middleware::CallApiMiddleware;
/// use call_api_runtime::transport::HttpTransport;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let middleware = CallApiMiddleware::new(HttpTransport::from_env()?);
/// let next = FnDispatch::new(|action| {
///     println!("{action:?}");
///     Ok(())
/// });
///
/// let call = CallApi::new("http://api.example.com/author")
///     .with_types(["AUTHOR_REQUEST", "AUTHOR_SUCCESS", "AUTHOR_FAILURE"]);
///
/// middleware.handle(Action::from(call), &next).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CallApiMiddleware<T> {
    transport: T,
    config: MiddlewareConfig,
}

impl<T: Transport> CallApiMiddleware<T> {
    /// Create a middleware with the default config
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, MiddlewareConfig::default())
    }

    /// Create a middleware with a factory-level config
    #[must_use]
    pub const fn with_config(transport: T, config: MiddlewareConfig) -> Self {
        Self { transport, config }
    }

    /// The transport calls are sent through
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Handle one action.
    ///
    /// Actions that are not call descriptors, and descriptors without a URL, are
    /// handed to `next` unchanged. Transport failures, non-2xx responses and
    /// payloads rejected by `is_success` all end in a failure action rather than
    /// an error.
    ///
    /// # Errors
    ///
    /// - [`MiddlewareError::InvalidTypes`] if `types` is not three names; nothing
    ///   is dispatched
    /// - [`MiddlewareError::Dispatch`] if `next` rejects an action
    #[tracing::instrument(
        skip_all,
        name = "call_api",
        fields(request = tracing::field::Empty, url = tracing::field::Empty)
    )]
    pub async fn handle(&self, action: Action, next: &dyn Dispatch) -> Result<(), MiddlewareError> {
        let call = match action {
            Action::CallApi(call) if is_valid_call_api(&call) => call,
            other => {
                tracing::trace!("Not a call descriptor, passing through");
                metrics::counter!(PASSTHROUGH_TOTAL).increment(1);
                return next.dispatch(other).await.map_err(Into::into);
            },
        };

        let types = ActionTypes::parse(call.types.as_slice())?;

        let span = tracing::Span::current();
        span.record("request", types.request.as_str());
        span.record("url", call.url.as_str());

        let meta = call.meta_or_default();

        tracing::debug!("Dispatching request action");
        metrics::counter!(REQUESTS_TOTAL).increment(1);
        next.dispatch(FluxAction::new(types.request.as_str(), call.request_payload(), meta.clone()).into())
            .await?;

        if let Some(cached) = call.cached_payload() {
            tracing::debug!("Answering from cached payload");
            metrics::counter!(CACHE_HITS_TOTAL).increment(1);
            next.dispatch(FluxAction::new(types.success, cached, meta).into())
                .await?;
            return Ok(());
        }

        let result = self.fetch(&call, next).await;

        match Self::outcome(&result, &call.resolve_hooks()) {
            Ok(payload) => {
                metrics::counter!(SUCCESS_TOTAL).increment(1);
                next.dispatch(FluxAction::new(types.success, payload, meta).into())
                    .await?;
            },
            Err(reason) => {
                next.dispatch(FluxAction::failure(types.failure, reason, meta).into())
                    .await?;
            },
        }

        Ok(())
    }

    /// Send the request and run the response through every stage.
    ///
    /// Never fails: a transport error is recorded in the returned data.
    async fn fetch(&self, call: &CallApi, next: &dyn Dispatch) -> FetchData {
        let mut options = serialize_options(call);
        let url = serialize_url(&call.url, &options);

        for before in [self.config.before(), call.before.as_ref()].into_iter().flatten() {
            let patch = before(&options, next).await;
            if let Some(patch) = patch {
                options.apply(patch);
            }
        }

        let started = Instant::now();
        let outcome = self.transport.fetch(&url, &options).await;
        let duration = started.elapsed();
        metrics::histogram!(FETCH_DURATION_SECONDS).record(duration.as_secs_f64());

        let mut data = FetchData::new(options, url);
        data.duration = duration;

        let data = match outcome {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), ?duration, "Response received");
                data.with_response(response)
            },
            Err(error) => {
                tracing::warn!(%error, ?duration, "Request failed");
                data.with_error(error)
            },
        };

        let stages: Vec<Stage<FetchData>> = default_stages()
            .into_iter()
            .chain(call.middlewares.iter().cloned())
            .collect();

        apply_middlewares(&stages, data).await
    }

    /// Decide between success and failure, running the matching hook.
    fn outcome(result: &FetchData, hooks: &Hooks) -> Result<Payload, Payload> {
        let payload = match result_filter(result) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(%error, kind = error.kind(), "Call failed");
                metrics::counter!(FAILURE_TOTAL, "kind" => error.kind()).increment(1);
                let reason = Payload::Error(error);
                (hooks.failure)(&reason);
                return Err(reason);
            },
        };

        if let Some(reason) = (hooks.is_success)(&payload).filter(is_truthy) {
            tracing::warn!(%reason, "Payload rejected by is_success");
            metrics::counter!(FAILURE_TOTAL, "kind" => REJECTED).increment(1);
            let reason = Payload::Json(reason);
            (hooks.failure)(&reason);
            return Err(reason);
        }

        (hooks.success)(result);
        Ok(payload)
    }
}
