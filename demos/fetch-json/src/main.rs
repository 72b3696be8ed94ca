//! Fetch JSON example binary
//!
//! Sends one call through the middleware and prints every action it
//! dispatches.
//!
//! ```text
//! fetch-json <url> [method] [json-data]
//! RUST_LOG=call_api_runtime=debug fetch-json https://httpbin.org/post post '{"name":"Abram"}'
//! ```

use call_api_core::{Action, CallApi, Dispatch, DispatchError};
use call_api_runtime::{CallApiMiddleware, HttpTransport};
use futures::future::BoxFuture;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prints actions as they reach the end of the chain
struct PrintingDispatcher;

impl Dispatch for PrintingDispatcher {
    fn dispatch(&self, action: Action) -> BoxFuture<'_, Result<(), DispatchError>> {
        let rendered = match &action {
            Action::Flux(flux) => serde_json::to_string_pretty(flux)
                .map_err(|e| DispatchError::Rejected(e.to_string())),
            Action::CallApi(call) => Ok(format!("{call:?}")),
        };
        Box::pin(async move {
            println!("{}\n", rendered?);
            Ok(())
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_json=info,call_api_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("usage: fetch-json <url> [method] [json-data]");
        std::process::exit(2);
    };

    let mut call = CallApi::new(url).with_types(["FETCH_REQUEST", "FETCH_SUCCESS", "FETCH_FAILURE"]);
    if let Some(method) = args.next() {
        call = call.with_method(method);
    }
    if let Some(data) = args.next() {
        call = call.with_data(serde_json::from_str::<Value>(&data)?);
    }

    println!("=== Fetch JSON Example: Call API Middleware ===\n");

    let middleware = CallApiMiddleware::new(HttpTransport::from_env()?);
    middleware.handle(Action::from(call), &PrintingDispatcher).await?;

    tracing::info!("Done");
    Ok(())
}
