//! Collaborators the middleware is given rather than owns.
//!
//! - [`Dispatch`]: the next handler in the dispatch chain (`next(action)`)
//! - [`Transport`]: the HTTP client (`fetch(url, options)`)
//!
//! Both use explicit `BoxFuture` returns instead of `async fn` so they can be
//! held as trait objects (`&dyn Dispatch`, `Arc<dyn Transport>`).

use crate::action::Action;
use crate::error::{DispatchError, TransportError};
use crate::options::FetchOptions;
use crate::response::Response;
use futures::future::BoxFuture;
use std::sync::Arc;

/// The next handler in the dispatch chain.
pub trait Dispatch: Send + Sync {
    /// Hand an action to the next handler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the handler cannot accept the action.
    fn dispatch(&self, action: Action) -> BoxFuture<'_, Result<(), DispatchError>>;
}

impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    fn dispatch(&self, action: Action) -> BoxFuture<'_, Result<(), DispatchError>> {
        (**self).dispatch(action)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for &D {
    fn dispatch(&self, action: Action) -> BoxFuture<'_, Result<(), DispatchError>> {
        (**self).dispatch(action)
    }
}

/// A [`Dispatch`] backed by a closure.
///
/// # Example
///
/// ```
/// use call_api_core::environment::{Dispatch, FnDispatch};
/// use call_api_core::action::{empty_object, FluxAction};
///
/// let next = FnDispatch::new(|action| {
///     println!("{action:?}");
///     Ok(())
/// });
///
/// # tokio_test::block_on(async {
/// next.dispatch(FluxAction::new("PING", empty_object(), empty_object()).into())
///     .await
///     .unwrap();
/// # });
/// ```
pub struct FnDispatch<F> {
    f: F,
}

impl<F> FnDispatch<F>
where
    F: Fn(Action) -> Result<(), DispatchError> + Send + Sync,
{
    /// Wrap a synchronous handler
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Dispatch for FnDispatch<F>
where
    F: Fn(Action) -> Result<(), DispatchError> + Send + Sync,
{
    fn dispatch(&self, action: Action) -> BoxFuture<'_, Result<(), DispatchError>> {
        let result = (self.f)(action);
        Box::pin(async move { result })
    }
}

/// The HTTP client used to perform calls.
pub trait Transport: Send + Sync {
    /// Send a request and buffer its response.
    ///
    /// Non-2xx statuses are responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained.
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        options: &'a FetchOptions,
    ) -> BoxFuture<'a, Result<Response, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        options: &'a FetchOptions,
    ) -> BoxFuture<'a, Result<Response, TransportError>> {
        (**self).fetch(url, options)
    }
}
