//! Error types for the TradeStation API client.
//!
//! Token lifecycle failures live in [`AuthError`](crate::auth::AuthError);
//! this module wraps them together with transport, decoding and API-level
//! failures of the request layer.

use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;

/// A specialized `Result` type for TradeStation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all TradeStation API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Obtaining or refreshing the bearer token failed
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: status={status}, message={message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable error message
        message: String,
        /// Raw response body for debugging
        body: Value,
    },

    /// The API rejected the bearer token
    #[error("Unauthorized; the access token was rejected")]
    Unauthorized,

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried.
    ///
    /// # Example
    ///
    /// ```
    /// use tradestation_rs::Error;
    /// use tradestation_rs::auth::AuthError;
    ///
    /// let err = Error::from(AuthError::NetworkTimeout);
    /// assert!(err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Auth(err) => err.is_retryable(),
            Error::Http(err) => err.is_timeout() || err.is_connect(),
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::Unauthorized)
    }

    /// Returns `true` if the session cannot recover without a new
    /// authorization by the user.
    pub fn requires_reauthorization(&self) -> bool {
        matches!(self, Error::Auth(err) if err.is_terminal())
    }

    /// Create an API error from a response.
    ///
    /// TradeStation error bodies carry `Error` and `Message` fields.
    pub(crate) fn from_api_response(status: u16, body: Value) -> Self {
        let message = ["Message", "message", "Error", "error"]
            .iter()
            .find_map(|key| body.get(*key).and_then(|m| m.as_str()))
            .unwrap_or("Unknown API error")
            .to_string();

        Error::Api {
            status,
            message,
            body,
        }
    }
}
