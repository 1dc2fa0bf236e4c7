//! OAuth client credentials.

use secrecy::{ExposeSecret, SecretString};

/// Scope requested when none is configured.
///
/// `offline_access` is what makes the server issue a refresh token.
pub const DEFAULT_SCOPE: &str =
    "openid offline_access profile MarketData ReadAccount Trade Crypto Matrix OptionSpreads";

/// Client credentials registered with TradeStation.
///
/// Credentials are immutable once built; the client secret is kept in a
/// [`SecretString`] and never appears in `Debug` output.
///
/// # Example
///
/// ```
/// use tradestation_rs::auth::Credentials;
///
/// let credentials = Credentials::new(
///     "my-client-id",
///     "my-client-secret",
///     "http://localhost:3000",
/// )
/// .with_scope("openid offline_access MarketData");
///
/// assert_eq!(credentials.client_id(), "my-client-id");
/// ```
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    scope: String,
}

impl Credentials {
    /// Create credentials with the default scope.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Replace the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// The client identifier (API key).
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The redirect URI registered for the application.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// The space-separated scope list.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub(crate) fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("id", "super-secret", "http://localhost:3000");
        let debug_str = format!("{:?}", credentials);

        assert!(!debug_str.contains("super-secret"));
        assert!(debug_str.contains("REDACTED"));
    }

    #[test]
    fn test_default_scope_requests_refresh_token() {
        let credentials = Credentials::new("id", "secret", "http://localhost:3000");
        assert!(credentials.scope().contains("offline_access"));
    }
}
