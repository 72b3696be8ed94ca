//! Error types for the Call API pipeline.
//!
//! Errors fall into two families:
//!
//! - [`CallApiError`]: runtime failures of a single call (transport, HTTP status,
//!   body decoding). These are captured as data, flow through the response
//!   pipeline, and end up as the payload of the failure action.
//! - [`MiddlewareError`]: failures of the middleware invocation itself (malformed
//!   `types`, a dispatcher that refuses actions). These are returned to the caller
//!   and never turned into actions.

use crate::action::Payload;
use crate::response::Response;
use thiserror::Error;

/// A network-level failure reported by a [`Transport`](crate::environment::Transport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error from a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying failure message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors produced while performing one API call.
///
/// All variants surface as the payload of the failure action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallApiError {
    /// The server answered with a non-2xx status
    ///
    /// The display message is the status text (e.g. `Forbidden`).
    #[error("{status_text}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Reason phrase for the status
        status_text: String,
        /// The full response
        response: Box<Response>,
        /// Body as parsed by the response parser, if any
        data: Option<Box<Payload>>,
    },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    /// The body claimed to be JSON but could not be decoded
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

impl CallApiError {
    /// HTTP status attached to the error, if the server responded
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Response attached to the error, if the server responded
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Http { response, .. } => Some(response),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Parsed response body attached to the error
    #[must_use]
    pub fn data(&self) -> Option<&Payload> {
        match self {
            Self::Http { data, .. } => data.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Short label used for logs and metric labels
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}

/// Errors returned by a [`Dispatch`](crate::environment::Dispatch) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The downstream handler no longer accepts actions
    #[error("Dispatcher closed")]
    Closed,

    /// The downstream handler refused the action
    #[error("Dispatch rejected: {0}")]
    Rejected(String),
}

/// Errors that abort a middleware invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareError {
    /// `types` was not exactly three action type names
    ///
    /// Raised before any action is dispatched.
    #[error("expect types as an array of 3 action types (request, success, failure), got {found}")]
    InvalidTypes {
        /// Number of usable entries found
        found: usize,
    },

    /// The downstream dispatcher failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
