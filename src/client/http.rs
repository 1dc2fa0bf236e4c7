//! HTTP client implementation for the TradeStation API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::auth::TokenManager;
use crate::{Environment, Error, Result};

use super::config::ClientConfig;

/// The main client for interacting with the TradeStation API.
///
/// The client sends requests relative to the environment's base URL and
/// authenticates each one with a bearer token from the shared
/// [`TokenManager`]. Response bodies are decoded into the caller's type.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tradestation_rs::{ClientConfig, Environment, TradeStationClient};
/// use tradestation_rs::auth::{Credentials, TokenManager};
///
/// # async fn example(code: &str) -> tradestation_rs::Result<()> {
/// let config = ClientConfig::default();
/// let credentials = Credentials::new("client-id", "secret", "http://localhost:3000");
/// let tokens = Arc::new(TokenManager::from_config(credentials, &config)?);
/// tokens.initialize(code).await?;
///
/// let client = TradeStationClient::new(tokens, Environment::Simulated, config)?;
/// let accounts: serde_json::Value = client.get("/brokerage/accounts").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TradeStationClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    tokens: Arc<TokenManager>,
    env: Environment,
    base_url: String,
    config: ClientConfig,
}

impl TradeStationClient {
    /// Create a client using `tokens` for authentication.
    pub fn new(
        tokens: Arc<TokenManager>,
        env: Environment,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| env.api_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                tokens,
                env,
                base_url,
                config,
            }),
        })
    }

    /// Get the current environment.
    pub fn environment(&self) -> Environment {
        self.inner.env
    }

    /// Get the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Get the token manager used by this client.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.inner.tokens
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.inner.http.get(self.inner.url(path));
        self.inner.send(request).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let request = self.inner.http.get(self.inner.url(path)).query(query);
        self.inner.send(request).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.inner.http.post(self.inner.url(path)).json(body);
        self.inner.send(request).await
    }

    /// Make a PUT request with a JSON body.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.inner.http.put(self.inner.url(path)).json(body);
        self.inner.send(request).await
    }

    /// Make a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.inner.http.delete(self.inner.url(path));
        self.inner.send(request).await
    }
}

impl ClientInner {
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Build request headers with a currently valid bearer token.
    async fn build_headers(&self) -> Result<HeaderMap> {
        let token = self.tokens.get_valid_token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::InvalidInput("Invalid token format".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let headers = self.build_headers().await?;
        let response = request.headers(headers).send().await?;

        self.handle_response(response).await
    }

    /// Handle an API response.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let status_code = status.as_u16();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        tracing::debug!(status = status_code, "API request failed");

        match status_code {
            401 => Err(Error::Unauthorized),
            404 => {
                let message = body
                    .get("Message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("Resource not found")
                    .to_string();
                Err(Error::NotFound(message))
            }
            _ => Err(Error::from_api_response(status_code, body)),
        }
    }
}

impl std::fmt::Debug for TradeStationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeStationClient")
            .field("env", &self.inner.env)
            .field("base_url", &self.inner.base_url)
            .field("config", &self.inner.config)
            .finish()
    }
}
