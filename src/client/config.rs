//! Client configuration options.

use std::time::Duration;

use crate::auth::{AUDIENCE, AUTHORIZE_URL, DEFAULT_SAFETY_MARGIN, TOKEN_URL};

/// Configuration for the TradeStation client.
///
/// # Example
///
/// ```
/// use tradestation_rs::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_refresh_margin(Duration::from_secs(120))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for API requests and token exchanges
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Minimum remaining token lifetime before a refresh is triggered
    pub refresh_margin: Duration,
    /// Overrides the environment's API base URL
    pub base_url: Option<String>,
    /// Browser authorization page
    pub authorize_url: String,
    /// Token endpoint
    pub token_url: String,
    /// Audience requested for access tokens
    pub audience: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("tradestation-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            refresh_margin: DEFAULT_SAFETY_MARGIN,
            base_url: None,
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            audience: AUDIENCE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the minimum remaining token lifetime before refreshing.
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Send API requests to `base_url` instead of the environment's host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the token endpoint URL.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Set the authorization page URL.
    pub fn with_authorize_url(mut self, authorize_url: impl Into<String>) -> Self {
        self.authorize_url = authorize_url.into();
        self
    }

    /// Set the audience requested for access tokens.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_margin, Duration::from_secs(60));
        assert_eq!(config.token_url, "https://signin.tradestation.com/oauth/token");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new()
            .with_base_url("http://127.0.0.1:8080")
            .with_token_url("http://127.0.0.1:8080/oauth/token")
            .with_refresh_margin(Duration::from_secs(5))
            .with_audience("https://sim-api.tradestation.com");

        assert_eq!(config.base_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.token_url, "http://127.0.0.1:8080/oauth/token");
        assert_eq!(config.refresh_margin, Duration::from_secs(5));
        assert_eq!(config.audience, "https://sim-api.tradestation.com");
    }
}
