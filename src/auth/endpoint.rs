//! The authorization server's token endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{AuthError, Credentials, TokenResponse, TOKEN_URL};
use crate::Result;

/// Grant presented to the token endpoint.
#[derive(Debug, Clone, Copy)]
pub enum TokenGrant<'a> {
    /// Exchange an authorization code from the browser redirect.
    AuthorizationCode {
        /// The code taken from the redirect URL
        code: &'a str,
    },
    /// Exchange a refresh token for a new access token.
    RefreshToken {
        /// The current refresh token
        refresh_token: &'a str,
    },
}

impl TokenGrant<'_> {
    /// The OAuth2 `grant_type` value.
    pub fn grant_type(&self) -> &'static str {
        match self {
            TokenGrant::AuthorizationCode { .. } => "authorization_code",
            TokenGrant::RefreshToken { .. } => "refresh_token",
        }
    }
}

/// Performs token exchanges against an authorization server.
///
/// [`HttpTokenEndpoint`] talks to TradeStation; tests provide their own
/// implementations.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Perform one exchange of `grant` for a token pair.
    async fn exchange(
        &self,
        credentials: &Credentials,
        grant: TokenGrant<'_>,
    ) -> std::result::Result<TokenResponse, AuthError>;
}

/// Token endpoint reached over HTTPS with form-encoded requests.
#[derive(Debug, Clone)]
pub struct HttpTokenEndpoint {
    http: reqwest::Client,
    token_url: String,
}

impl HttpTokenEndpoint {
    /// Create an endpoint for TradeStation's sign-in server.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_url(TOKEN_URL, timeout)
    }

    /// Create an endpoint for a custom token URL.
    pub fn with_url(token_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            token_url: token_url.into(),
        })
    }

    /// The URL token requests are posted to.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange(
        &self,
        credentials: &Credentials,
        grant: TokenGrant<'_>,
    ) -> std::result::Result<TokenResponse, AuthError> {
        let mut form = vec![
            ("grant_type", grant.grant_type()),
            ("client_id", credentials.client_id()),
            ("client_secret", credentials.client_secret()),
        ];
        match grant {
            TokenGrant::AuthorizationCode { code } => {
                form.push(("code", code));
                form.push(("redirect_uri", credentials.redirect_uri()));
            }
            TokenGrant::RefreshToken { refresh_token } => {
                form.push(("refresh_token", refresh_token));
            }
        }

        tracing::debug!(
            url = %self.token_url,
            grant_type = grant.grant_type(),
            "Requesting token"
        );

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_transport)?;

        if !(200..300).contains(&status) {
            return Err(classify_failure(status, &body, grant));
        }

        serde_json::from_str(&body)
            .map_err(|e| AuthError::UnexpectedResponseShape(e.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct OAuthErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

fn classify_transport(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::NetworkTimeout
    } else if err.is_decode() {
        AuthError::UnexpectedResponseShape(err.to_string())
    } else {
        AuthError::Network(err.to_string())
    }
}

/// Map a non-success token endpoint response to an [`AuthError`].
pub(crate) fn classify_failure(status: u16, body: &str, grant: TokenGrant<'_>) -> AuthError {
    let parsed: OAuthErrorBody = serde_json::from_str(body).unwrap_or_default();
    let description = parsed
        .error_description
        .clone()
        .or_else(|| parsed.error.clone())
        .unwrap_or_else(|| format!("status {}", status));

    match parsed.error.as_deref() {
        Some("invalid_client") | Some("unauthorized_client") => {
            AuthError::InvalidCredentials(description)
        }
        Some("invalid_grant") | Some("access_denied") => match grant {
            TokenGrant::AuthorizationCode { .. } => {
                AuthError::InvalidOrExpiredAuthorizationCode(description)
            }
            TokenGrant::RefreshToken { .. } => AuthError::RefreshTokenRevoked(description),
        },
        _ if status == 401 => AuthError::InvalidCredentials(description),
        _ if status >= 500 => AuthError::Server { status },
        _ => AuthError::UnexpectedResponseShape(format!(
            "status {}: {}",
            status, description
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: TokenGrant<'static> = TokenGrant::AuthorizationCode { code: "abc" };
    const REFRESH: TokenGrant<'static> = TokenGrant::RefreshToken { refresh_token: "r" };

    #[test]
    fn test_grant_types() {
        assert_eq!(CODE.grant_type(), "authorization_code");
        assert_eq!(REFRESH.grant_type(), "refresh_token");
    }

    #[test]
    fn test_invalid_grant_depends_on_grant() {
        let body = r#"{"error":"invalid_grant","error_description":"Unknown or invalid refresh token."}"#;

        assert_eq!(
            classify_failure(403, body, REFRESH),
            AuthError::RefreshTokenRevoked("Unknown or invalid refresh token.".into())
        );
        assert!(matches!(
            classify_failure(403, body, CODE),
            AuthError::InvalidOrExpiredAuthorizationCode(_)
        ));
    }

    #[test]
    fn test_invalid_client() {
        let body = r#"{"error":"invalid_client"}"#;
        assert_eq!(
            classify_failure(400, body, CODE),
            AuthError::InvalidCredentials("invalid_client".into())
        );
    }

    #[test]
    fn test_unauthorized_status_without_body() {
        assert!(matches!(
            classify_failure(401, "", REFRESH),
            AuthError::InvalidCredentials(_)
        ));
    }

    #[test]
    fn test_server_errors_are_transient() {
        let err = classify_failure(503, "<html>unavailable</html>", REFRESH);
        assert_eq!(err, AuthError::Server { status: 503 });
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unknown_client_error() {
        assert!(matches!(
            classify_failure(400, r#"{"error":"invalid_request"}"#, CODE),
            AuthError::UnexpectedResponseShape(_)
        ));
    }
}
