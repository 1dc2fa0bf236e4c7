//! HTTP client for the TradeStation API.
//!
//! This module provides [`TradeStationClient`], which attaches a valid
//! bearer token to every request, and its [`ClientConfig`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tradestation_rs::{ClientConfig, Environment, TradeStationClient};
//! use tradestation_rs::auth::{Credentials, TokenManager};
//!
//! # async fn example() -> tradestation_rs::Result<()> {
//! let config = ClientConfig::default();
//! let credentials = Credentials::new("client-id", "secret", "http://localhost:3000");
//! let tokens = Arc::new(TokenManager::from_config(credentials, &config)?);
//! tokens.initialize_from_refresh_token("refresh-token").await?;
//!
//! let client = TradeStationClient::new(tokens, Environment::Simulated, config)?;
//! let quotes: serde_json::Value = client.get("/marketdata/quotes/MSFT").await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod http;

pub use config::ClientConfig;
pub use http::TradeStationClient;
