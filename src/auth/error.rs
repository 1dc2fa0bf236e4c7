//! Failure modes of the OAuth token lifecycle.

use thiserror::Error;

/// Errors raised while acquiring or refreshing OAuth tokens.
///
/// Errors are `Clone` so that concurrent callers waiting on the same
/// refresh can all receive its outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The authorization server rejected the client id or secret
    #[error("Invalid client credentials: {0}")]
    InvalidCredentials(String),

    /// The authorization code was rejected, already used, or expired
    #[error("Authorization code rejected: {0}")]
    InvalidOrExpiredAuthorizationCode(String),

    /// The refresh token was revoked or has expired
    #[error("Refresh token revoked: {0}")]
    RefreshTokenRevoked(String),

    /// The token request did not complete within the configured timeout
    #[error("Token request timed out")]
    NetworkTimeout,

    /// The authorization server answered with something other than a token
    #[error("Unexpected token response: {0}")]
    UnexpectedResponseShape(String),

    /// No token is held; the user has to authorize the application
    #[error("Not authenticated; authorization required")]
    NotAuthenticated,

    /// The token request failed at the transport level
    #[error("Network error: {0}")]
    Network(String),

    /// The authorization server failed with a 5xx status
    #[error("Authorization server error: status={status}")]
    Server {
        /// HTTP status code
        status: u16,
    },

    /// The user (or the server) denied the authorization request
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The `state` value in the redirect does not match the request
    #[error("State mismatch in authorization redirect; possible cross-site request forgery")]
    StateMismatch,
}

impl AuthError {
    /// Returns `true` if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::NetworkTimeout | AuthError::Network(_) | AuthError::Server { .. }
        )
    }

    /// Returns `true` if the session is lost and the user must authorize
    /// the application again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials(_)
                | AuthError::InvalidOrExpiredAuthorizationCode(_)
                | AuthError::RefreshTokenRevoked(_)
                | AuthError::NotAuthenticated
                | AuthError::AuthorizationDenied(_)
                | AuthError::StateMismatch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(AuthError::NetworkTimeout.is_retryable());
        assert!(AuthError::Network("connection reset".into()).is_retryable());
        assert!(AuthError::Server { status: 502 }.is_retryable());
        assert!(!AuthError::NetworkTimeout.is_terminal());
    }

    #[test]
    fn test_credential_errors_are_terminal() {
        assert!(AuthError::InvalidCredentials("bad secret".into()).is_terminal());
        assert!(AuthError::RefreshTokenRevoked("revoked".into()).is_terminal());
        assert!(AuthError::InvalidOrExpiredAuthorizationCode("used".into()).is_terminal());
        assert!(!AuthError::RefreshTokenRevoked("revoked".into()).is_retryable());
    }

    #[test]
    fn test_unexpected_shape_is_neither() {
        let err = AuthError::UnexpectedResponseShape("missing access_token".into());
        assert!(!err.is_retryable());
        assert!(!err.is_terminal());
    }
}
