//! # tradestation-rs
//!
//! A Rust client for the TradeStation brokerage API.
//!
//! The crate handles TradeStation's OAuth2 authorization-code flow and keeps
//! the resulting access token valid for as long as the session lives. The
//! request layer is deliberately thin: requests are sent to the brokerage,
//! market data and order execution endpoints as given, with a bearer token
//! attached, and responses are decoded into the caller's types.
//!
//! ## Features
//!
//! - **Authorization**: authorize URL generation with anti-forgery state and
//!   redirect parsing
//! - **Token lifecycle**: code exchange, lazy refresh within a configurable
//!   safety margin, one refresh at a time no matter how many tasks ask
//! - **Environments**: live and simulated (paper trading) hosts
//! - **Async-first**: built on Tokio and reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tradestation_rs::{ClientConfig, Environment, TradeStationClient};
//! use tradestation_rs::auth::{AuthorizationRequest, Credentials, TokenManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let credentials = Credentials::new("client-id", "client-secret", "http://localhost:3000");
//!
//!     let request = AuthorizationRequest::from_config(&credentials, &config)?;
//!     println!("Authorize at: {}", request.url());
//!
//!     let mut redirect = String::new();
//!     std::io::stdin().read_line(&mut redirect)?;
//!     let code = request.parse_redirect(&redirect)?;
//!
//!     let tokens = Arc::new(TokenManager::from_config(credentials, &config)?);
//!     tokens.initialize(&code).await?;
//!
//!     let client = TradeStationClient::new(tokens, Environment::Simulated, config)?;
//!     let accounts: serde_json::Value = client.get("/brokerage/accounts").await?;
//!     println!("{:#}", accounts);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use auth::{AuthError, Credentials, TokenManager, TokenState};
pub use client::{ClientConfig, TradeStationClient};
pub use error::{Error, Result};
pub use models::Environment;

/// Prelude module for convenient imports.
///
/// ```rust
/// use tradestation_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{
        AuthError, AuthorizationRequest, Credentials, HttpTokenEndpoint, TokenEndpoint,
        TokenManager, TokenState,
    };
    pub use crate::client::{ClientConfig, TradeStationClient};
    pub use crate::error::{Error, Result};
    pub use crate::models::Environment;
}
