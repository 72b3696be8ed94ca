//! # Call API Runtime
//!
//! The middleware that turns call descriptors into HTTP calls and lifecycle
//! actions.
//!
//! ## Core Components
//!
//! - **`CallApiMiddleware`**: validates descriptors, dispatches the request action,
//!   drives the transport and the response stages, dispatches the outcome
//! - **`HttpTransport`**: a reqwest-backed [`Transport`](call_api_core::Transport)
//! - **`MiddlewareConfig`**: factory-level settings (the shared `before` hook)
//!
//! ## Example
//!
//! ```no_run
//! use call_api_core::{Action, CallApi, FnDispatch};
//! use call_api_runtime::{CallApiMiddleware, HttpTransport, HttpTransportConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let middleware = CallApiMiddleware::new(HttpTransport::new(HttpTransportConfig::default())?);
//! let next = FnDispatch::new(|action| {
//!     println!("{action:?}");
//!     Ok(())
//! });
//!
//! let call = CallApi::new("http://api.example.com/user")
//!     .with_types(["USER_REQUEST", "USER_SUCCESS", "USER_FAILURE"])
//!     .with_method("post")
//!     .with_data(json!({"name": "Abram"}));
//!
//! middleware.handle(Action::from(call), &next).await?;
//! # Ok(())
//! # }
//! ```

/// Factory-level middleware settings
pub mod config;

/// The orchestrating middleware
pub mod middleware;

/// Metric names and descriptions
pub mod metrics;

/// reqwest-backed transport
pub mod transport;

pub use config::{MiddlewareConfig, MiddlewareConfigBuilder};
pub use middleware::CallApiMiddleware;
pub use transport::{HttpTransport, HttpTransportConfig, HttpTransportError};
