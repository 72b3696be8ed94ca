//! Middleware configuration.
//!
//! # Example
//!
//! ```
//! use call_api_core::options::FetchOptionsPatch;
//! use call_api_runtime::config::MiddlewareConfig;
//!
//! let config = MiddlewareConfig::builder()
//!     .before(|options, _dispatch| {
//!         Box::pin(async move {
//!             let mut headers = options.headers.clone();
//!             headers.insert("x-client".to_string(), "web".to_string());
//!             Some(FetchOptionsPatch::default().headers(headers))
//!         })
//!     })
//!     .build();
//!
//! assert!(config.before().is_some());
//! ```

use call_api_core::descriptor::BeforeHook;
use call_api_core::environment::Dispatch;
use call_api_core::options::{FetchOptions, FetchOptionsPatch};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Settings shared by every call a middleware handles.
///
/// # Default Values
///
/// - `before`: none
#[derive(Clone, Default)]
pub struct MiddlewareConfig {
    before: Option<BeforeHook>,
}

impl MiddlewareConfig {
    /// Create a new config builder.
    #[must_use]
    pub const fn builder() -> MiddlewareConfigBuilder {
        MiddlewareConfigBuilder { before: None }
    }

    /// Options hook run before each call's own `before` hook.
    #[must_use]
    pub const fn before(&self) -> Option<&BeforeHook> {
        self.before.as_ref()
    }
}

impl fmt::Debug for MiddlewareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareConfig")
            .field("before", &self.before.is_some())
            .finish()
    }
}

/// Builder for [`MiddlewareConfig`].
#[derive(Default)]
pub struct MiddlewareConfigBuilder {
    before: Option<BeforeHook>,
}

impl MiddlewareConfigBuilder {
    /// Set the factory-level options hook.
    ///
    /// A returned patch overrides the serialized options; the per-call hook
    /// still runs afterwards and can override again.
    #[must_use]
    pub fn before<F>(mut self, before: F) -> Self
    where
        F: for<'a> Fn(&'a FetchOptions, &'a dyn Dispatch) -> BoxFuture<'a, Option<FetchOptionsPatch>>
            + Send
            + Sync
            + 'static,
    {
        self.before = Some(Arc::new(before));
        self
    }

    /// Build the [`MiddlewareConfig`].
    #[must_use]
    pub fn build(self) -> MiddlewareConfig {
        MiddlewareConfig { before: self.before }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_api_core::environment::FnDispatch;

    #[test]
    fn default_has_no_hook() {
        assert!(MiddlewareConfig::default().before().is_none());
        assert!(MiddlewareConfig::builder().build().before().is_none());
    }

    #[tokio::test]
    async fn builder_stores_hook() {
        let config = MiddlewareConfig::builder()
            .before(|_, _| Box::pin(async { Some(FetchOptionsPatch::default().method("PUT")) }))
            .build();

        let next = FnDispatch::new(|_| Ok(()));
        let options = FetchOptions::default();
        let patch = match config.before() {
            Some(before) => before(&options, &next).await,
            None => None,
        };

        assert_eq!(patch.and_then(|patch| patch.method), Some("PUT".to_string()));
        assert_eq!(format!("{config:?}"), "MiddlewareConfig { before: true }");
    }
}
