//! Actions flowing through the dispatch chain.
//!
//! Incoming traffic is an [`Action`]: either an ordinary [`FluxAction`] that the
//! middleware passes along untouched, or a [`CallApi`] descriptor that it consumes.
//! Everything the middleware emits is a [`FluxAction`] of the request, success or
//! failure flavor.

use crate::descriptor::CallApi;
use crate::error::CallApiError;
use crate::response::Response;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Key that marks a JSON action as a call descriptor.
pub const CALL_API: &str = "CALL_API";

/// JavaScript-style truthiness for JSON values.
///
/// `null`, `false`, `0` and `""` are falsy; every other value, including empty
/// objects and arrays, is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The empty object used when `data` or `meta` is missing.
#[must_use]
pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Payload carried by a dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured data (decoded JSON, text, request data, cached value, failure reason)
    Json(Value),
    /// A response whose content type the parser does not understand
    Response(Response),
    /// The error that failed the call
    Error(CallApiError),
}

impl Payload {
    /// The JSON value, if this payload is one
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Response(_) | Self::Error(_) => None,
        }
    }

    /// The error, if this payload is one
    #[must_use]
    pub const fn as_error(&self) -> Option<&CallApiError> {
        match self {
            Self::Error(error) => Some(error),
            Self::Json(_) | Self::Response(_) => None,
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::Json(empty_object())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<CallApiError> for Payload {
    fn from(error: CallApiError) -> Self {
        Self::Error(error)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Json(value) => value.serialize(serializer),
            Self::Response(response) => response.serialize(serializer),
            Self::Error(error) => {
                let mut state = serializer.serialize_struct("Error", 3)?;
                state.serialize_field("message", &error.to_string())?;
                state.serialize_field("status", &error.status())?;
                state.serialize_field("data", &error.data())?;
                state.end()
            },
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::Json)
    }
}

/// A flux standard action: `{ type, payload, meta, error? }`.
///
/// `payload` and `meta` are always present; `error` is serialized only when set.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct FluxAction {
    /// Action type name
    #[serde(rename = "type")]
    pub action_type: String,
    /// Action payload
    #[serde(default)]
    pub payload: Payload,
    /// Metadata copied from the call descriptor
    #[serde(default = "empty_object")]
    pub meta: Value,
    /// Set on failure actions only
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl FluxAction {
    /// Create a non-error action
    #[must_use]
    pub fn new(action_type: impl Into<String>, payload: impl Into<Payload>, meta: Value) -> Self {
        Self {
            action_type: action_type.into(),
            payload: payload.into(),
            meta,
            error: false,
        }
    }

    /// Create an error action (`error: true`)
    #[must_use]
    pub fn failure(action_type: impl Into<String>, payload: impl Into<Payload>, meta: Value) -> Self {
        Self {
            error: true,
            ..Self::new(action_type, payload, meta)
        }
    }
}

/// Anything that can be sent down the dispatch chain.
#[derive(Debug, Clone)]
pub enum Action {
    /// Ordinary action; ignored by the middleware
    Flux(FluxAction),
    /// Call descriptor; consumed by the middleware
    CallApi(Box<CallApi>),
}

impl Action {
    /// Build an action from its JSON form.
    ///
    /// An object holding a [`CALL_API`] object becomes [`Action::CallApi`]; anything
    /// else must be a flux action.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the value is neither a call descriptor nor a
    /// flux action.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(mut object) if object.get(CALL_API).is_some_and(Value::is_object) => {
                let descriptor = object.remove(CALL_API).unwrap_or_default();
                Ok(Self::CallApi(Box::new(CallApi::from_value(&descriptor))))
            },
            other => serde_json::from_value(other).map(Self::Flux),
        }
    }

    /// The flux action, if this is one
    #[must_use]
    pub const fn as_flux(&self) -> Option<&FluxAction> {
        match self {
            Self::Flux(action) => Some(action),
            Self::CallApi(_) => None,
        }
    }

    /// The call descriptor, if this is one
    #[must_use]
    pub fn as_call_api(&self) -> Option<&CallApi> {
        match self {
            Self::CallApi(call) => Some(&**call),
            Self::Flux(_) => None,
        }
    }
}

impl From<FluxAction> for Action {
    fn from(action: FluxAction) -> Self {
        Self::Flux(action)
    }
}

impl From<CallApi> for Action {
    fn from(call: CallApi) -> Self {
        Self::CallApi(Box::new(call))
    }
}
