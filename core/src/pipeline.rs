//! Built-in response stages.
//!
//! Every call runs its [`FetchData`] through [`default_stages`] before any stage
//! supplied by the descriptor:
//!
//! 1. [`response_parser`] reads the body into `data` according to its content type
//! 2. [`result_transformer`] turns a non-2xx status into an error
//!
//! [`result_filter`] then extracts the payload or the error from the final record.

use crate::action::Payload;
use crate::chain::{Stage, transformer};
use crate::error::CallApiError;
use crate::fetch_data::FetchData;
use crate::response::ContentKind;
use serde_json::Value;

/// Parse the response body into `data`.
///
/// - JSON content is decoded; an empty body decodes to `null`, an invalid one
///   records [`CallApiError::Decode`]
/// - text content is decoded as JSON when possible, otherwise kept as a string
/// - any other content carries the raw response as the payload
///
/// Records without a response are returned unchanged.
pub async fn response_parser(data: FetchData) -> FetchData {
    let Some(response) = &data.response else {
        return data;
    };

    match response.content_kind() {
        ContentKind::Json if response.body().is_empty() => data.with_data(Value::Null),
        ContentKind::Json => match response.json() {
            Ok(value) => data.with_data(value),
            Err(error) => {
                tracing::warn!(url = %data.url, %error, "Response body is not valid JSON");
                data.with_error(CallApiError::Decode(error.to_string()))
            },
        },
        ContentKind::Text => {
            let text = response.text();
            let parsed = serde_json::from_str(&text).unwrap_or(Value::String(text));
            data.with_data(parsed)
        },
        ContentKind::Other => {
            let raw = Payload::Response(response.clone());
            data.with_data(raw)
        },
    }
}

/// Record an HTTP error for non-2xx responses.
///
/// The error carries the status text as its message, plus the status, the
/// response and the body parsed by [`response_parser`]. Successful responses and
/// records without a response are returned unchanged.
pub async fn result_transformer(data: FetchData) -> FetchData {
    let Some(response) = &data.response else {
        return data;
    };

    if response.ok() {
        return data;
    }

    let error = CallApiError::Http {
        status: response.status().as_u16(),
        status_text: response.status_text(),
        response: Box::new(response.clone()),
        data: data.data.clone().map(Box::new),
    };

    data.with_error(error)
}

/// Extract the payload of a finished record.
///
/// A record without data resolves to `null`.
///
/// # Errors
///
/// Returns the recorded error, if any.
pub fn result_filter(data: &FetchData) -> Result<Payload, CallApiError> {
    if let Some(error) = &data.error {
        return Err(error.clone());
    }

    Ok(data.data.clone().unwrap_or(Payload::Json(Value::Null)))
}

/// The two stages every call runs first: [`response_parser`] then
/// [`result_transformer`].
#[must_use]
pub fn default_stages() -> Vec<Stage<FetchData>> {
    vec![
        Some(transformer(response_parser)),
        Some(transformer(result_transformer)),
    ]
}
