//! Browser authorization step of the authorization-code flow.

use std::collections::HashMap;

use rand::RngCore;
use url::Url;

use super::{AuthError, Credentials, AUDIENCE, AUTHORIZE_URL};
use crate::{ClientConfig, Result};

/// A pending authorization request.
///
/// The user opens [`url`](Self::url) in a browser, signs in, and is sent
/// back to the redirect URI. The URL they land on is handed to
/// [`parse_redirect`](Self::parse_redirect), which checks the `state`
/// value and extracts the authorization code.
///
/// # Example
///
/// ```
/// use tradestation_rs::auth::{AuthorizationRequest, Credentials};
///
/// let credentials = Credentials::new("client-id", "secret", "http://localhost:3000");
/// let request = AuthorizationRequest::new(&credentials)?;
///
/// let redirect = format!("http://localhost:3000/?code=abc123&state={}", request.state());
/// assert_eq!(request.parse_redirect(&redirect)?, "abc123");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    url: Url,
    state: String,
}

impl AuthorizationRequest {
    /// Create a request against TradeStation's sign-in server with a
    /// random state value.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Self::with_endpoint(credentials, AUTHORIZE_URL, AUDIENCE)
    }

    /// Create a request against the authorize URL and audience in `config`.
    pub fn from_config(credentials: &Credentials, config: &ClientConfig) -> Result<Self> {
        Self::with_endpoint(credentials, &config.authorize_url, &config.audience)
    }

    /// Create a request against a custom authorize URL and audience.
    pub fn with_endpoint(
        credentials: &Credentials,
        authorize_url: &str,
        audience: &str,
    ) -> Result<Self> {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let state = hex::encode(bytes);

        let mut url = Url::parse(authorize_url)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", credentials.client_id())
            .append_pair("audience", audience)
            .append_pair("redirect_uri", credentials.redirect_uri())
            .append_pair("state", &state)
            .append_pair("scope", credentials.scope());

        Ok(Self { url, state })
    }

    /// The URL to open in a browser.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The anti-forgery state value sent with the request.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Extract the authorization code from the URL the browser was
    /// redirected to.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthorizationDenied`] if the redirect reports an error
    /// - [`AuthError::StateMismatch`] if the state is missing or differs
    /// - [`AuthError::UnexpectedResponseShape`] if the URL is malformed or
    ///   carries no code
    pub fn parse_redirect(&self, redirect: &str) -> std::result::Result<String, AuthError> {
        let redirect = Url::parse(redirect.trim()).map_err(|e| {
            AuthError::UnexpectedResponseShape(format!("invalid redirect URL: {}", e))
        })?;
        let params: HashMap<String, String> = redirect.query_pairs().into_owned().collect();

        if let Some(reason) = params
            .get("error_description")
            .or_else(|| params.get("error"))
        {
            return Err(AuthError::AuthorizationDenied(reason.trim().to_string()));
        }

        match params.get("state") {
            Some(state) if state.trim() == self.state => {}
            _ => return Err(AuthError::StateMismatch),
        }

        params
            .get("code")
            .map(|code| code.trim())
            .filter(|code| !code.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                AuthError::UnexpectedResponseShape(
                    "redirect URL carries no authorization code".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AuthorizationRequest {
        let credentials = Credentials::new("client-id", "secret", "http://localhost:3000");
        AuthorizationRequest::new(&credentials).unwrap()
    }

    #[test]
    fn test_url_carries_query_parameters() {
        let request = request();
        let params: HashMap<String, String> =
            request.url().query_pairs().into_owned().collect();

        assert!(request.url().as_str().starts_with(AUTHORIZE_URL));
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["audience"], AUDIENCE);
        assert_eq!(params["redirect_uri"], "http://localhost:3000");
        assert_eq!(params["state"], request.state());
        assert!(params["scope"].contains("offline_access"));
    }

    #[test]
    fn test_from_config_uses_configured_page() {
        let credentials = Credentials::new("client-id", "secret", "http://localhost:3000");
        let config = ClientConfig::default().with_authorize_url("http://127.0.0.1:9000/authorize");
        let request = AuthorizationRequest::from_config(&credentials, &config).unwrap();

        assert_eq!(request.url().host_str(), Some("127.0.0.1"));
        assert_eq!(request.url().path(), "/authorize");
    }

    #[test]
    fn test_state_is_random_hex() {
        let a = request();
        let b = request();

        assert_eq!(a.state().len(), 32);
        assert!(a.state().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.state(), b.state());
    }

    #[test]
    fn test_parse_redirect_returns_code() {
        let request = request();
        let redirect = format!(
            "  http://localhost:3000/?code=%20abc123&state={}\n",
            request.state()
        );

        assert_eq!(request.parse_redirect(&redirect).unwrap(), "abc123");
    }

    #[test]
    fn test_parse_redirect_rejects_state_mismatch() {
        let request = request();
        let redirect = "http://localhost:3000/?code=abc123&state=forged";

        assert_eq!(
            request.parse_redirect(redirect),
            Err(AuthError::StateMismatch)
        );
    }

    #[test]
    fn test_parse_redirect_rejects_missing_state() {
        let request = request();
        assert_eq!(
            request.parse_redirect("http://localhost:3000/?code=abc123"),
            Err(AuthError::StateMismatch)
        );
    }

    #[test]
    fn test_parse_redirect_reports_error_description() {
        let request = request();
        let redirect = format!(
            "http://localhost:3000/?error=access_denied&error_description=User%20cancelled&state={}",
            request.state()
        );

        assert_eq!(
            request.parse_redirect(&redirect),
            Err(AuthError::AuthorizationDenied("User cancelled".into()))
        );
    }

    #[test]
    fn test_parse_redirect_requires_code() {
        let request = request();
        let redirect = format!("http://localhost:3000/?state={}", request.state());

        assert!(matches!(
            request.parse_redirect(&redirect),
            Err(AuthError::UnexpectedResponseShape(_))
        ));
    }

    #[test]
    fn test_parse_redirect_rejects_garbage() {
        assert!(matches!(
            request().parse_redirect("not a url"),
            Err(AuthError::UnexpectedResponseShape(_))
        ));
    }
}
