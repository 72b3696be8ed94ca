//! Final request URL construction.

use crate::options::FetchOptions;
use serde_json::{Map, Value};
use url::{Url, form_urlencoded};

/// Methods whose JSON object body is also merged into the query string.
pub const WRITE_METHODS: [&str; 4] = ["POST", "PUT", "PATCH", "DELETE"];

/// Build the final URL for a request.
///
/// Explicit `query` parameters are merged first, then, for [`WRITE_METHODS`], the
/// fields of a JSON object body. With nothing to merge, `url` is returned as given.
#[must_use]
pub fn serialize_url(url: &str, options: &FetchOptions) -> String {
    let mut endpoint = url.to_string();

    if let Some(query) = &options.query {
        endpoint = merge_querystring(&endpoint, &object_pairs(query));
    }

    if WRITE_METHODS.contains(&options.method.as_str()) {
        if let Some(Value::Object(body)) = options
            .body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
        {
            endpoint = merge_querystring(&endpoint, &object_pairs(&body));
        }
    }

    endpoint
}

/// Merge `params` into the query string of `url`.
///
/// The URL's existing parameters stay in front. A key present in both is
/// replaced at its existing position; new keys are appended in order. Relative
/// URLs are merged textually.
#[must_use]
pub fn merge_querystring(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    match Url::parse(url) {
        Ok(mut parsed) => {
            let existing = parsed
                .query_pairs()
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            let merged = merge_pairs(existing, params);
            parsed.query_pairs_mut().clear().extend_pairs(&merged);
            parsed.to_string()
        },
        Err(error) => {
            tracing::trace!(%url, %error, "Merging query into unparsed URL");
            merge_relative(url, params)
        },
    }
}

fn merge_relative(url: &str, params: &[(String, String)]) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let existing = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let merged = merge_pairs(existing, params);
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&merged)
        .finish();

    let mut result = format!("{path}?{encoded}");
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}

fn merge_pairs(
    mut existing: Vec<(String, String)>,
    params: &[(String, String)],
) -> Vec<(String, String)> {
    let mut keys: Vec<&str> = Vec::new();
    for (key, _) in params {
        if !keys.contains(&key.as_str()) {
            keys.push(key);
        }
    }

    for key in keys {
        // All values of one key move together (arrays become repeated keys).
        let values = params
            .iter()
            .filter(|(k, _)| k == key)
            .cloned()
            .collect::<Vec<_>>();

        match existing.iter().position(|(k, _)| k == key) {
            Some(index) => {
                existing.retain(|(k, _)| k != key);
                existing.splice(index..index, values);
            },
            None => existing.extend(values),
        }
    }

    existing
}

fn object_pairs(object: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(object.len());

    for (key, value) in object {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), query_value(item))));
            },
            other => pairs.push((key.clone(), query_value(other))),
        }
    }

    pairs
}

fn query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        },
    }
}
