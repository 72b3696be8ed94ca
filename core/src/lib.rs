//! # Call API Core
//!
//! Types and pure building blocks for the Call API middleware.
//!
//! An action that carries a [`descriptor::CallApi`] describes one HTTP call. The
//! middleware (in `call-api-runtime`) turns it into a request action, performs
//! the call, runs the response through a chain of stages and finishes with a
//! success or failure action.
//!
//! ## Modules
//!
//! - [`action`]: incoming actions, Flux Standard Actions, payloads
//! - [`descriptor`]: the call descriptor and its hooks
//! - [`validation`]: descriptor and `types` checks
//! - [`options`]: fetch option serialization
//! - [`endpoint`]: query and body merging into the request URL
//! - [`chain`]: the async transformer chain runner
//! - [`pipeline`]: built-in response stages and the result filter
//! - [`environment`]: the `Dispatch` and `Transport` collaborators
//!
//! ## Example
//!
//! ```
//! use call_api_core::descriptor::CallApi;
//! use call_api_core::endpoint::serialize_url;
//! use call_api_core::options::serialize_options;
//! use serde_json::json;
//!
//! let call = CallApi::new("http://api.example.com/posts")
//!     .with_types(["POSTS_REQUEST", "POSTS_SUCCESS", "POSTS_FAILURE"])
//!     .with_query(json!({"page": 2}));
//!
//! let options = serialize_options(&call);
//! assert_eq!(options.method, "GET");
//! assert_eq!(serialize_url(&call.url, &options), "http://api.example.com/posts?page=2");
//! ```

pub mod action;
pub mod chain;
pub mod descriptor;
pub mod endpoint;
pub mod environment;
pub mod error;
pub mod fetch_data;
pub mod options;
pub mod pipeline;
pub mod response;
pub mod validation;

pub use action::{Action, CALL_API, FluxAction, Payload, is_truthy};
pub use chain::{Stage, Transformer, apply_middlewares, transformer};
pub use descriptor::{CallApi, Hooks};
pub use environment::{Dispatch, FnDispatch, Transport};
pub use error::{CallApiError, DispatchError, MiddlewareError, TransportError};
pub use fetch_data::FetchData;
pub use options::{FetchOptions, FetchOptionsPatch};
pub use response::Response;
pub use validation::ActionTypes;
