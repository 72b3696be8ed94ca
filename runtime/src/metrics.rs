//! Metric names and descriptions.
//!
//! The middleware records through the `metrics` facade; install any recorder
//! (for example a Prometheus exporter) in the host application to collect them.

use metrics::{describe_counter, describe_histogram};

/// Calls that passed validation and dispatched a request action
pub const REQUESTS_TOTAL: &str = "call_api_requests_total";
/// Calls answered from `cached` without a transport call
pub const CACHE_HITS_TOTAL: &str = "call_api_cache_hits_total";
/// Calls that dispatched a success action
pub const SUCCESS_TOTAL: &str = "call_api_success_total";
/// Calls that dispatched a failure action, labelled by `kind`
pub const FAILURE_TOTAL: &str = "call_api_failure_total";
/// Actions handed to the next handler untouched
pub const PASSTHROUGH_TOTAL: &str = "call_api_passthrough_total";
/// Time spent in the transport call
pub const FETCH_DURATION_SECONDS: &str = "call_api_fetch_duration_seconds";

/// `kind` label of a failure flagged by an `is_success` hook
pub const REJECTED: &str = "rejected";

/// Register all metric descriptions.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        REQUESTS_TOTAL,
        "Total number of API calls that dispatched a request action"
    );
    describe_counter!(
        CACHE_HITS_TOTAL,
        "Total number of API calls answered from the cached payload"
    );
    describe_counter!(SUCCESS_TOTAL, "Total number of successful API calls");
    describe_counter!(
        FAILURE_TOTAL,
        "Total number of failed API calls by kind (transport, http, decode, rejected)"
    );
    describe_counter!(
        PASSTHROUGH_TOTAL,
        "Total number of actions passed through without an API call"
    );
    describe_histogram!(
        FETCH_DURATION_SECONDS,
        "Time taken by the transport to produce a response"
    );
}
