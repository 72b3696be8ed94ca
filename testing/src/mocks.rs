//! Mock collaborators: a recording store and a scripted transport.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use call_api_core::action::{Action, FluxAction};
use call_api_core::environment::{Dispatch, Transport};
use call_api_core::error::{DispatchError, TransportError};
use call_api_core::options::FetchOptions;
use call_api_core::response::Response;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Dispatcher that records every action it receives.
///
/// Stands in for the store at the end of the dispatch chain. Clones share the
/// same record.
///
/// # Example
///
/// ```
/// use call_api_core::action::{empty_object, FluxAction};
/// use call_api_core::environment::Dispatch;
/// use call_api_testing::RecordingDispatcher;
///
/// # tokio_test::block_on(async {
/// let store = RecordingDispatcher::new();
/// store.dispatch(FluxAction::new("PING", empty_object(), empty_object()).into())
///     .await
///     .unwrap();
///
/// assert_eq!(store.action_types(), vec!["PING"]);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    actions: Arc<Mutex<Vec<Action>>>,
    accept: Option<usize>,
    deferred: bool,
}

impl RecordingDispatcher {
    /// Create a dispatcher that accepts everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher that rejects every action after the first `count`
    #[must_use]
    pub fn rejecting_after(count: usize) -> Self {
        Self {
            accept: Some(count),
            ..Self::default()
        }
    }

    /// Create a dispatcher that records an action only once its future is awaited
    ///
    /// Behaves like a store whose work happens inside the returned future, so
    /// an action whose dispatch is never awaited is never seen.
    #[must_use]
    pub fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::default()
        }
    }

    /// All accepted actions, in dispatch order
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    /// Accepted flux actions, in dispatch order
    #[must_use]
    pub fn flux_actions(&self) -> Vec<FluxAction> {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .filter_map(Action::as_flux)
            .cloned()
            .collect()
    }

    /// Types of the accepted flux actions
    #[must_use]
    pub fn action_types(&self) -> Vec<String> {
        self.flux_actions()
            .into_iter()
            .map(|action| action.action_type)
            .collect()
    }

    /// Accepted flux actions in their wire form
    #[must_use]
    pub fn to_json(&self) -> Vec<Value> {
        self.flux_actions()
            .iter()
            .map(|action| serde_json::to_value(action).unwrap())
            .collect()
    }

    /// Number of accepted actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.lock().unwrap().len()
    }

    /// Whether nothing was accepted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.lock().unwrap().is_empty()
    }

    /// Forget all recorded actions (for test isolation)
    pub fn clear(&self) {
        self.actions.lock().unwrap().clear();
    }

    fn record(&self, action: Action) -> Result<(), DispatchError> {
        let mut actions = self.actions.lock().unwrap();
        if self.accept.is_some_and(|limit| actions.len() >= limit) {
            Err(DispatchError::Rejected(format!("{action:?}")))
        } else {
            actions.push(action);
            Ok(())
        }
    }
}

impl Dispatch for RecordingDispatcher {
    fn dispatch(&self, action: Action) -> BoxFuture<'_, Result<(), DispatchError>> {
        if self.deferred {
            return Box::pin(async move { self.record(action) });
        }
        let result = self.record(action);
        Box::pin(async move { result })
    }
}

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Final request URL
    pub url: String,
    /// Options after every `before` hook
    pub options: FetchOptions,
}

type Reply = Result<Response, TransportError>;

/// Transport that answers from a script and records every request.
///
/// Replies are matched by exact URL, first registration first; unmatched
/// requests get the fallback reply, or a transport error when none is set.
/// Clones share routes and records.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Vec<(String, Reply)>>>,
    fallback: Arc<Mutex<Option<Reply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a transport with no replies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport answering every request with `response`
    #[must_use]
    pub fn responding(response: Response) -> Self {
        let transport = Self::new();
        transport.fallback(Ok(response));
        transport
    }

    /// Create a transport failing every request with `message`
    #[must_use]
    pub fn failing(message: &str) -> Self {
        let transport = Self::new();
        transport.fallback(Err(TransportError::new(message)));
        transport
    }

    /// Answer requests to `url` with `response`
    #[must_use]
    pub fn route(self, url: impl Into<String>, response: Response) -> Self {
        self.routes.lock().unwrap().push((url.into(), Ok(response)));
        self
    }

    /// Fail requests to `url` with `message`
    #[must_use]
    pub fn route_error(self, url: impl Into<String>, message: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((url.into(), Err(TransportError::new(message))));
        self
    }

    /// Set the reply for unmatched requests
    pub fn fallback(&self, reply: Result<Response, TransportError>) {
        *self.fallback.lock().unwrap() = Some(reply);
    }

    /// Every request received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn reply(&self, url: &str) -> Reply {
        let routed = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(route, _)| route == url)
            .map(|(_, reply)| reply.clone());

        routed
            .or_else(|| self.fallback.lock().unwrap().clone())
            .unwrap_or_else(|| Err(TransportError::new(format!("no route for {url}"))))
    }
}

impl Transport for MockTransport {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        options: &'a FetchOptions,
    ) -> BoxFuture<'a, Result<Response, TransportError>> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            options: options.clone(),
        });
        let reply = self.reply(url).map(|response| response.with_url(url));
        Box::pin(async move { reply })
    }
}
