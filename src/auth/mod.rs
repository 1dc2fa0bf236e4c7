//! OAuth2 authentication for the TradeStation API.
//!
//! TradeStation uses the authorization-code flow. The user authorizes the
//! application once in a browser; the code from the redirect is exchanged
//! for a short-lived access token and a long-lived refresh token. The
//! [`TokenManager`] then keeps the access token fresh.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tradestation_rs::auth::{AuthorizationRequest, Credentials, TokenManager};
//! use tradestation_rs::ClientConfig;
//!
//! # async fn example(redirect_url: &str) -> tradestation_rs::Result<()> {
//! let credentials = Credentials::new("client-id", "client-secret", "http://localhost:3000");
//!
//! // 1. Send the user to the authorization page.
//! let request = AuthorizationRequest::new(&credentials)?;
//! println!("Open {}", request.url());
//!
//! // 2. Exchange the code from the redirect for tokens.
//! let code = request.parse_redirect(redirect_url)?;
//! let manager = TokenManager::from_config(credentials, &ClientConfig::default())?;
//! manager.initialize(&code).await?;
//!
//! // 3. Get a valid token before each request.
//! let token = manager.get_valid_token().await?;
//! # Ok(())
//! # }
//! ```

mod authorize;
mod credentials;
mod endpoint;
mod error;
mod manager;
mod token;

pub use authorize::AuthorizationRequest;
pub use credentials::{Credentials, DEFAULT_SCOPE};
pub use endpoint::{HttpTokenEndpoint, TokenEndpoint, TokenGrant};
pub use error::AuthError;
pub use manager::{TokenManager, DEFAULT_EXCHANGE_TIMEOUT, DEFAULT_SAFETY_MARGIN};
pub use token::{TokenResponse, TokenState};

/// Browser authorization page.
pub const AUTHORIZE_URL: &str = "https://signin.tradestation.com/authorize";

/// Token endpoint for code and refresh exchanges.
pub const TOKEN_URL: &str = "https://signin.tradestation.com/oauth/token";

/// Audience requested for API access tokens.
pub const AUDIENCE: &str = "https://api.tradestation.com";
