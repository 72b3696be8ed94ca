//! reqwest-backed HTTP transport.

use call_api_core::environment::Transport;
use call_api_core::error::TransportError;
use call_api_core::options::FetchOptions;
use call_api_core::response::Response;
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use thiserror::Error;

/// Environment variable overriding the `user-agent` header
pub const USER_AGENT_VAR: &str = "CALL_API_USER_AGENT";

/// `user-agent` sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("call-api/", env!("CARGO_PKG_VERSION"));

/// Errors raised while setting up an [`HttpTransport`].
#[derive(Error, Debug)]
pub enum HttpTransportError {
    /// The underlying client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Transport settings.
///
/// # Default Values
///
/// - `user_agent`: `call-api/<version>`
/// - `default_headers`: none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// `user-agent` header of every request
    pub user_agent: String,
    /// Headers sent with every request; per-call headers win on conflict
    pub default_headers: BTreeMap<String, String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: BTreeMap::new(),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new config builder.
    #[must_use]
    pub fn builder() -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder::default()
    }

    /// Read settings from the environment.
    ///
    /// `CALL_API_USER_AGENT` overrides the user agent; everything else keeps its
    /// default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(user_agent) = std::env::var(USER_AGENT_VAR).ok().filter(|ua| !ua.is_empty()) {
            config.user_agent = user_agent;
        }
        config
    }
}

/// Builder for [`HttpTransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportConfigBuilder {
    user_agent: Option<String>,
    default_headers: BTreeMap<String, String>,
}

impl HttpTransportConfigBuilder {
    /// Set the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Build the [`HttpTransportConfig`].
    #[must_use]
    pub fn build(self) -> HttpTransportConfig {
        HttpTransportConfig {
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            default_headers: self.default_headers,
        }
    }
}

/// [`Transport`] over a shared [`reqwest::Client`].
///
/// Responses are buffered in full. The client keeps no cookie store, so the
/// `credentials` option is only logged.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a transport with its own client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTransportError::Build`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: HttpTransportConfig) -> Result<Self, HttpTransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpTransportError::Build(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a transport from the environment (see [`HttpTransportConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns [`HttpTransportError::Build`] if the client cannot be built.
    pub fn from_env() -> Result<Self, HttpTransportError> {
        Self::new(HttpTransportConfig::from_env())
    }

    /// Reuse an existing client.
    #[must_use]
    pub const fn with_client(client: Client, config: HttpTransportConfig) -> Self {
        Self { client, config }
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    async fn send(&self, url: &str, options: &FetchOptions) -> Result<Response, TransportError> {
        let method = Method::from_bytes(options.method.as_bytes())
            .map_err(|e| TransportError::new(format!("invalid method {}: {e}", options.method)))?;

        tracing::trace!(
            %method,
            url,
            credentials = %options.credentials,
            "Sending request"
        );

        let mut headers = HeaderMap::new();
        for (name, value) in self.config.default_headers.iter().chain(&options.headers) {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::new(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::new(format!("invalid header value for {name}: {e}")))?;
            headers.insert(name, value);
        }

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let final_url = response.url().to_string();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(Response::new(status, headers, body).with_url(final_url))
    }
}

impl Transport for HttpTransport {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        options: &'a FetchOptions,
    ) -> BoxFuture<'a, Result<Response, TransportError>> {
        Box::pin(self.send(url, options))
    }
}
