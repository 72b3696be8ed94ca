//! # Call API Testing
//!
//! Testing utilities and helpers for the Call API middleware.
//!
//! This crate provides:
//! - [`RecordingDispatcher`], a store that records every dispatched action
//! - [`MockTransport`], a scripted transport that records every request
//! - Canned responses ([`json_response`], [`text_response`], [`bytes_response`])
//! - [`CallApiTest`], a Given-When-Then harness, and [`assertions`]
//! - proptest strategies in [`properties`]
//!
//! ## Example
//!
//! ```
//! use call_api_core::{Action, CallApi};
//! use call_api_runtime::CallApiMiddleware;
//! use call_api_testing::{MockTransport, RecordingDispatcher, text_response};
//! use http::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::responding(text_response(StatusCode::FORBIDDEN, "no"));
//! let store = RecordingDispatcher::new();
//! let middleware = CallApiMiddleware::new(transport);
//!
//! let call = CallApi::new("http://h/author").with_types(["REQ", "OK", "ERR"]);
//! middleware.handle(Action::from(call), &store).await.unwrap();
//!
//! assert_eq!(store.action_types(), vec!["REQ", "ERR"]);
//! # });
//! ```


/// Canned responses
pub mod fixtures;

/// Mock collaborators
pub mod mocks;

/// Property-based testing utilities using proptest.
pub mod properties {
    use call_api_core::action::{FluxAction, empty_object};
    use proptest::prelude::*;
    use serde_json::Value;

    /// Action type names (`SCREAMING_SNAKE` words)
    pub fn action_type() -> impl Strategy<Value = String> {
        "[A-Z][A-Z_]{0,15}"
    }

    /// `types` lists of any length but three
    pub fn invalid_types() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(action_type(), 0..8).prop_filter("three types are valid", |types| {
            types.len() != 3
        })
    }

    /// Scalar JSON values
    pub fn json_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ]
    }

    /// Truthy JSON values suitable as a cached payload
    pub fn truthy_payload() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Bool(true)),
            (1_i64..1000).prop_map(Value::from),
            "[a-z]{1,12}".prop_map(Value::String),
            prop::collection::vec(json_scalar(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", json_scalar(), 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    }

    /// Ordinary flux actions
    pub fn flux_action() -> impl Strategy<Value = FluxAction> {
        (action_type(), json_scalar())
            .prop_map(|(action_type, payload)| FluxAction::new(action_type, payload, empty_object()))
    }
}

pub use call_api_test::{CallApiTest, assertions};
pub use fixtures::{bytes_response, json_response, text_response};
pub use mocks::{MockTransport, RecordedRequest, RecordingDispatcher};

/// Install a fmt subscriber that writes through the test harness.
///
/// Filtered by `RUST_LOG`; calling it more than once is harmless.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tracing_init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }

    proptest! {
        #[test]
        fn invalid_types_never_have_three(types in properties::invalid_types()) {
            prop_assert_ne!(types.len(), 3);
        }

        #[test]
        fn truthy_payloads_are_truthy(value in properties::truthy_payload()) {
            prop_assert!(call_api_core::is_truthy(&value));
        }
    }
}
