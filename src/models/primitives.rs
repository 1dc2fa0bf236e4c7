//! Primitive types shared across the client.

use std::fmt;

/// Environment configuration for the TradeStation API.
///
/// Determines which API host requests go to: live trading or the
/// simulated (paper trading) host. Both share the same sign-in server.
///
/// # Example
///
/// ```
/// use tradestation_rs::Environment;
///
/// let env = Environment::Simulated;
/// assert_eq!(env.api_base_url(), "https://sim-api.tradestation.com/v3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Live environment - real trading with real money.
    Live,
    /// Simulated environment for paper trading.
    #[default]
    Simulated,
}

impl Environment {
    /// Get the base URL for REST API requests.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Live => "https://api.tradestation.com/v3",
            Environment::Simulated => "https://sim-api.tradestation.com/v3",
        }
    }

    /// Returns `true` if orders placed here are real.
    pub fn is_live(&self) -> bool {
        matches!(self, Environment::Live)
    }

    /// Returns `true` if this is the paper trading environment.
    pub fn is_simulated(&self) -> bool {
        matches!(self, Environment::Simulated)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Live => write!(f, "live"),
            Environment::Simulated => write!(f, "simulated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_urls() {
        assert_eq!(
            Environment::Live.api_base_url(),
            "https://api.tradestation.com/v3"
        );
        assert_eq!(
            Environment::Simulated.api_base_url(),
            "https://sim-api.tradestation.com/v3"
        );
    }

    #[test]
    fn test_default_is_paper_trading() {
        assert!(Environment::default().is_simulated());
        assert!(!Environment::default().is_live());
        assert_eq!(Environment::Live.to_string(), "live");
    }
}
