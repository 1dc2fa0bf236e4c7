//! Manual authorization example.
//!
//! This example walks through TradeStation's authorization-code flow:
//! it opens the sign-in page, asks for the URL the browser was redirected
//! to, and then lists the accounts of the simulated environment.
//!
//! Run with: cargo run --example manual_auth

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tradestation_rs::auth::{AuthorizationRequest, Credentials, TokenManager};
use tradestation_rs::{ClientConfig, Environment, TradeStationClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Get credentials from environment variables
    let client_id = std::env::var("TRADESTATION_CLIENT_ID")
        .expect("TRADESTATION_CLIENT_ID environment variable required");
    let client_secret = std::env::var("TRADESTATION_CLIENT_SECRET")
        .expect("TRADESTATION_CLIENT_SECRET environment variable required");
    let redirect_uri = std::env::var("TRADESTATION_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    let config = ClientConfig::default();
    let credentials = Credentials::new(client_id, client_secret, redirect_uri);
    let request = AuthorizationRequest::from_config(&credentials, &config)?;

    println!("Please go to this URL to authorize the application:");
    println!("{}", request.url());
    println!(
        "After logging in the page may say \"Unable to connect\"; copy the URL from the address bar anyway."
    );
    if webbrowser::open(request.url().as_str()).is_err() {
        println!("(could not open a browser, open the URL manually)");
    }

    print!("Redirect URL: ");
    io::stdout().flush()?;
    let mut redirect = String::new();
    io::stdin().lock().read_line(&mut redirect)?;

    let code = request.parse_redirect(&redirect)?;
    let tokens = Arc::new(TokenManager::from_config(credentials, &config)?);
    let state = tokens.initialize(&code).await?;
    println!("Authorized; access token expires at {}", state.expires_at());

    let client = TradeStationClient::new(tokens, Environment::Simulated, config)?;
    let accounts: serde_json::Value = client.get("/brokerage/accounts").await?;
    println!("{:#}", accounts);

    Ok(())
}
