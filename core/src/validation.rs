//! Shape checks for call descriptors.

use crate::descriptor::CallApi;
use crate::error::MiddlewareError;

/// Whether a descriptor is one this middleware should handle.
///
/// Descriptors without a URL are not calls; the middleware passes them on.
#[must_use]
pub fn is_valid_call_api(call: &CallApi) -> bool {
    !call.url.is_empty()
}

/// Whether `types` names exactly a request, a success and a failure type.
#[must_use]
pub fn is_valid_types<S: AsRef<str>>(types: &[S]) -> bool {
    types.len() == 3
}

/// The three action type names of a call, in lifecycle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypes {
    /// Dispatched before the request is sent
    pub request: String,
    /// Dispatched with the payload on success
    pub success: String,
    /// Dispatched with the error or reason on failure
    pub failure: String,
}

impl ActionTypes {
    /// Validate a `types` list.
    ///
    /// # Errors
    ///
    /// Returns [`MiddlewareError::InvalidTypes`] unless exactly three names are given.
    pub fn parse<S: AsRef<str>>(types: &[S]) -> Result<Self, MiddlewareError> {
        let invalid = || MiddlewareError::InvalidTypes { found: types.len() };
        if !is_valid_types(types) {
            return Err(invalid());
        }
        let [request, success, failure] = types else {
            return Err(invalid());
        };
        Ok(Self {
            request: request.as_ref().to_string(),
            success: success.as_ref().to_string(),
            failure: failure.as_ref().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_types() {
        assert!(!is_valid_types::<&str>(&[]));
        assert!(!is_valid_types(&["request", "success"]));
        assert!(is_valid_types(&["request", "success", "failure"]));
        assert!(!is_valid_types(&["a", "b", "c", "d"]));
    }

    #[test]
    fn valid_call_api() {
        assert!(!is_valid_call_api(&CallApi::default()));
        assert!(is_valid_call_api(&CallApi::new("url")));
    }

    #[test]
    fn parse_types_in_order() {
        let types = ActionTypes::parse(&["REQ", "OK", "ERR"]).unwrap();
        assert_eq!(types.request, "REQ");
        assert_eq!(types.success, "OK");
        assert_eq!(types.failure, "ERR");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(
            ActionTypes::parse(&["REQ", "OK"]),
            Err(MiddlewareError::InvalidTypes { found: 2 })
        );
    }
}
