//! End-to-end scenarios against a mock HTTP server
//!
//! Drives the middleware through the real reqwest transport.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use call_api_core::{Action, CallApi, CallApiError, FetchOptionsPatch, Payload};
use call_api_runtime::{CallApiMiddleware, HttpTransport, HttpTransportConfig, MiddlewareConfig};
use call_api_testing::{RecordingDispatcher, assertions, init_test_tracing};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TYPES: [&str; 3] = ["request", "success", "failure"];

fn author_body() -> Value {
    json!({"author": "Abram", "email": "abram.style@gmail.com"})
}

fn middleware(config: MiddlewareConfig) -> CallApiMiddleware<HttpTransport> {
    let transport = HttpTransport::new(HttpTransportConfig::default()).unwrap();
    CallApiMiddleware::with_config(transport, config)
}

fn call(server: &MockServer, route: &str) -> CallApi {
    CallApi::new(format!("{}{route}", server.uri())).with_types(TYPES)
}

/// Echoes whether the `x-is-gray` header arrived
fn gray_reply(request: &Request) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "type": "with headers",
        "isGray": request.headers.contains_key("x-is-gray"),
    }))
}

fn add_gray_header(options: &call_api_core::FetchOptions) -> Option<FetchOptionsPatch> {
    let mut headers = options.headers.clone();
    headers.insert("x-is-gray".to_string(), "yes".to_string());
    Some(FetchOptionsPatch::default().headers(headers))
}

async fn run(middleware: &CallApiMiddleware<HttpTransport>, call: CallApi) -> RecordingDispatcher {
    let store = RecordingDispatcher::new();
    middleware.handle(Action::from(call), &store).await.unwrap();
    store
}

#[tokio::test]
async fn test_get_object_response() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/author"))
        .respond_with(ResponseTemplate::new(200).set_body_json(author_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = run(&middleware(MiddlewareConfig::default()), call(&server, "/author")).await;

    assert_eq!(
        store.to_json(),
        vec![
            json!({"type": "request", "payload": {}, "meta": {}}),
            json!({"type": "success", "payload": author_body(), "meta": {}}),
        ]
    );
}

#[tokio::test]
async fn test_get_string_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Lorem ipsum dolor sit amet"))
        .mount(&server)
        .await;

    let store = run(&middleware(MiddlewareConfig::default()), call(&server, "/content")).await;
    let actions = store.flux_actions();

    assertions::assert_action_types(&actions, &["request", "success"]);
    assertions::assert_success(&actions[1], &json!("Lorem ipsum dolor sit amet"));
}

#[tokio::test]
async fn test_forbidden_response_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(403).set_body_string("You have no Access"))
        .mount(&server)
        .await;

    let store = run(&middleware(MiddlewareConfig::default()), call(&server, "/private")).await;
    let actions = store.flux_actions();

    assertions::assert_action_types(&actions, &["request", "failure"]);
    assertions::assert_failure_message(&actions[1], "Forbidden");

    let error = actions[1].payload.as_error().unwrap();
    assert_eq!(error.status(), Some(403));
    assert_eq!(error.data(), Some(&Payload::Json(json!("You have no Access"))));
    assert_eq!(
        store.to_json()[1],
        json!({
            "type": "failure",
            "payload": {"message": "Forbidden", "status": 403, "data": "You have no Access"},
            "meta": {},
            "error": true
        })
    );
}

#[tokio::test]
async fn test_server_error_response_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/internal"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server Error"))
        .mount(&server)
        .await;

    let store = run(&middleware(MiddlewareConfig::default()), call(&server, "/internal")).await;
    let actions = store.flux_actions();

    assertions::assert_failure_message(&actions[1], "Internal Server Error");
    assert_eq!(actions[1].payload.as_error().and_then(CallApiError::status), Some(500));
}

#[tokio::test]
async fn test_post_sends_body_and_query() {
    let data = json!({"id": "c4ca4238a0b923820dcc509a6f75849b", "name": "Abram", "age": 25});
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user"))
        .and(query_param("name", "Abram"))
        .and(query_param("age", "25"))
        .respond_with(|request: &Request| {
            ResponseTemplate::new(200).set_body_raw(request.body.clone(), "application/json")
        })
        .expect(1)
        .mount(&server)
        .await;

    let store = run(
        &middleware(MiddlewareConfig::default()),
        call(&server, "/user").with_method("POST").with_data(data.clone()),
    )
    .await;
    let actions = store.flux_actions();

    assertions::assert_action_types(&actions, &["request", "success"]);
    assert_eq!(actions[0].payload, Payload::Json(data.clone()));
    assertions::assert_success(&actions[1], &data);
}

#[tokio::test]
async fn test_json_body_overrides_lowercase_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user"))
        .and(wiremock::matchers::header("content-type", "application/json"))
        .and(wiremock::matchers::header("accept", "application/json"))
        .respond_with(|request: &Request| {
            let content_types: Vec<String> = request
                .headers
                .get_all("content-type")
                .iter()
                .map(|value| value.to_str().unwrap().to_string())
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({"contentType": content_types}))
        })
        .expect(1)
        .mount(&server)
        .await;

    let store = run(
        &middleware(MiddlewareConfig::default()),
        call(&server, "/user")
            .with_method("POST")
            .with_data(json!({"a": 1}))
            .with_header("content-type", "text/plain")
            .with_header("Accept", "text/html"),
    )
    .await;

    assertions::assert_success(
        &store.flux_actions()[1],
        &json!({"contentType": ["application/json"]}),
    );
}

#[tokio::test]
async fn test_put_data() {
    let data = json!({"id": "c4ca4238a0b923820dcc509a6f75849b", "age": 28});
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/user"))
        .respond_with(|request: &Request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            ResponseTemplate::new(200).set_body_json(json!({"type": "put", "body": body}))
        })
        .mount(&server)
        .await;

    let store = run(
        &middleware(MiddlewareConfig::default()),
        call(&server, "/user").with_method("put").with_data(data.clone()),
    )
    .await;

    assertions::assert_success(&store.flux_actions()[1], &json!({"type": "put", "body": data}));
}

#[tokio::test]
async fn test_factory_before_is_applied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/before"))
        .respond_with(gray_reply)
        .mount(&server)
        .await;

    let config = MiddlewareConfig::builder()
        .before(|options, _| Box::pin(async move { add_gray_header(options) }))
        .build();
    let store = run(&middleware(config), call(&server, "/before")).await;

    assertions::assert_success(
        &store.flux_actions()[1],
        &json!({"type": "with headers", "isGray": true}),
    );
}

#[tokio::test]
async fn test_call_before_is_applied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/before"))
        .respond_with(gray_reply)
        .mount(&server)
        .await;

    let store = run(
        &middleware(MiddlewareConfig::default()),
        call(&server, "/before")
            .with_before(|options, _| Box::pin(async move { add_gray_header(options) })),
    )
    .await;

    assertions::assert_success(
        &store.flux_actions()[1],
        &json!({"type": "with headers", "isGray": true}),
    );
}

#[tokio::test]
async fn test_without_before_no_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/before"))
        .respond_with(gray_reply)
        .mount(&server)
        .await;

    let store = run(&middleware(MiddlewareConfig::default()), call(&server, "/before")).await;

    assertions::assert_success(
        &store.flux_actions()[1],
        &json!({"type": "with headers", "isGray": false}),
    );
}

#[tokio::test]
async fn test_cached_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/author"))
        .respond_with(ResponseTemplate::new(200).set_body_json(author_body()))
        .expect(0)
        .mount(&server)
        .await;

    let store = run(
        &middleware(MiddlewareConfig::default()),
        call(&server, "/author").with_cached(author_body()),
    )
    .await;

    assert_eq!(
        store.to_json(),
        vec![
            json!({"type": "request", "payload": {}, "meta": {}}),
            json!({"type": "success", "payload": author_body(), "meta": {}}),
        ]
    );
}

#[tokio::test]
async fn test_success_hook_runs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/author"))
        .respond_with(ResponseTemplate::new(200).set_body_json(author_body()))
        .mount(&server)
        .await;

    let flag = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&flag);
    let call = call(&server, "/author").with_success(move |result| {
        assert_eq!(result.response.as_ref().map(|r| r.status().as_u16()), Some(200));
        seen.store(true, Ordering::SeqCst);
    });

    run(&middleware(MiddlewareConfig::default()), call).await;

    assert!(flag.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_is_success_turns_ok_into_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/200failure"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "user is not exists."})),
        )
        .mount(&server)
        .await;

    let failed = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&failed);
    let call = call(&server, "/200failure")
        .with_is_success(|payload| {
            let body = payload.as_json()?;
            if body["success"] == json!(false) {
                Some(body["message"].clone())
            } else {
                None
            }
        })
        .with_failure(move |_| seen.store(true, Ordering::SeqCst));

    let store = run(&middleware(MiddlewareConfig::default()), call).await;
    let actions = store.flux_actions();

    assertions::assert_action_types(&actions, &["request", "failure"]);
    assertions::assert_failure_reason(&actions[1], &json!("user is not exists."));
    assert!(failed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_query_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("page", "2"))
        .and(query_param("sort", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = run(
        &middleware(MiddlewareConfig::default()),
        call(&server, "/posts?sort=new").with_query(json!({"page": 2})),
    )
    .await;

    assertions::assert_success(&store.flux_actions()[1], &json!([]));
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/before"))
        .and(wiremock::matchers::header("x-is-gray", "default"))
        .respond_with(gray_reply)
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(
        HttpTransportConfig::builder()
            .default_header("x-is-gray", "default")
            .build(),
    )
    .unwrap();
    let store = run(&CallApiMiddleware::new(transport), call(&server, "/before")).await;

    assertions::assert_action_types(&store.flux_actions(), &["request", "success"]);
}

#[tokio::test]
async fn test_call_headers_override_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/before"))
        .and(wiremock::matchers::header("x-is-gray", "call"))
        .respond_with(gray_reply)
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(
        HttpTransportConfig::builder()
            .default_header("x-is-gray", "default")
            .build(),
    )
    .unwrap();
    let store = run(
        &CallApiMiddleware::new(transport),
        call(&server, "/before").with_header("x-is-gray", "call"),
    )
    .await;

    assertions::assert_action_types(&store.flux_actions(), &["request", "success"]);
}

#[tokio::test]
async fn test_transport_failure_becomes_failure_action() {
    let call = CallApi::new("http://127.0.0.1:1/author").with_types(TYPES);

    let store = run(&middleware(MiddlewareConfig::default()), call).await;
    let actions = store.flux_actions();

    assertions::assert_action_types(&actions, &["request", "failure"]);
    assert!(actions[1].error);
    assert_eq!(actions[1].payload.as_error().map(CallApiError::kind), Some("transport"));
}
