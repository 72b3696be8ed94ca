//! The record threaded through the response pipeline.

use crate::action::Payload;
use crate::error::CallApiError;
use crate::options::FetchOptions;
use crate::response::Response;
use std::time::Duration;

/// Everything known about one call while its response is processed.
///
/// Stages take the record by value and return an updated one, so no stage can
/// observe another's in-progress changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchData {
    /// Options the request was sent with
    pub fetch_options: FetchOptions,
    /// Final request URL
    pub url: String,
    /// Transport response, absent when the request failed
    pub response: Option<Response>,
    /// Failure recorded so far
    pub error: Option<CallApiError>,
    /// Parsed payload
    pub data: Option<Payload>,
    /// Time spent waiting for the transport
    pub duration: Duration,
}

impl FetchData {
    /// Start a record for a request that has not been sent yet
    #[must_use]
    pub const fn new(fetch_options: FetchOptions, url: String) -> Self {
        Self {
            fetch_options,
            url,
            response: None,
            error: None,
            data: None,
            duration: Duration::ZERO,
        }
    }

    /// Attach the transport response
    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    /// Attach an error
    #[must_use]
    pub fn with_error(mut self, error: impl Into<CallApiError>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach a payload
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }
}
