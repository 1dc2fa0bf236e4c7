//! Token state held for an authenticated session.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::AuthError;

/// Successful response of the token endpoint.
///
/// `refresh_token` is absent from refresh responses unless the server
/// rotates refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Newly issued access token
    pub access_token: String,
    /// Newly issued refresh token, if any
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
    /// Token type, normally `Bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The access/refresh token pair of a session and its expiry.
///
/// A `TokenState` is never mutated in place; each refresh produces a new
/// one that replaces the previous state wholesale.
#[derive(Clone)]
pub struct TokenState {
    access_token: SecretString,
    refresh_token: SecretString,
    token_type: String,
    expires_at: DateTime<Utc>,
    lifetime: Option<Duration>,
}

impl TokenState {
    /// Create a bearer token state.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            token_type: default_token_type(),
            expires_at,
            lifetime: None,
        }
    }

    /// Build the state from a token endpoint response.
    ///
    /// When the response carries no refresh token, `previous_refresh` is
    /// kept. Fails if either token would end up empty or `expires_in`
    /// does not fit a timestamp.
    pub(crate) fn from_response(
        response: TokenResponse,
        previous_refresh: Option<&str>,
    ) -> Result<Self, AuthError> {
        if response.access_token.trim().is_empty() {
            return Err(AuthError::UnexpectedResponseShape(
                "empty access_token".to_string(),
            ));
        }

        let refresh_token = response
            .refresh_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| previous_refresh.map(String::from))
            .ok_or_else(|| {
                AuthError::UnexpectedResponseShape("missing refresh_token".to_string())
            })?;

        let lifetime = Duration::try_seconds(response.expires_in);
        let expires_at = lifetime
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::UnexpectedResponseShape("expires_in out of range".to_string())
            })?;

        Ok(Self {
            access_token: SecretString::from(response.access_token),
            refresh_token: SecretString::from(refresh_token),
            token_type: response.token_type,
            expires_at,
            lifetime,
        })
    }

    /// The access token to send as a bearer credential.
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// The refresh token used to obtain the next access token.
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    /// The token type reported by the server.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// When the access token expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// The lifetime the server granted, if the state came from a token
    /// response.
    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    /// Check if the access token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the access token expires within `margin` from now.
    pub fn expires_within(&self, margin: Duration) -> bool {
        Utc::now() + margin >= self.expires_at
    }
}

impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
