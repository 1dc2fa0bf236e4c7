//! Token lifecycle management for TradeStation API authentication.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use super::{AuthError, Credentials, HttpTokenEndpoint, TokenEndpoint, TokenGrant, TokenState};
use crate::client::ClientConfig;
use crate::Error;

/// Default minimum remaining lifetime before a token is refreshed.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Default bound on a single token exchange.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the OAuth token pair of a session and hands out valid access
/// tokens.
///
/// A manager starts out unauthenticated. [`initialize`](Self::initialize)
/// exchanges an authorization code for the first token pair; after that
/// [`get_valid_token`](Self::get_valid_token) returns the current access
/// token, refreshing it first when it would expire within the safety
/// margin. A refresh that fails with a revoked refresh token or rejected
/// credentials drops the session back to unauthenticated.
///
/// # Thread Safety
///
/// Share a manager behind an `Arc`. Refreshes are serialized: when several
/// tasks find the token expiring at once, one of them performs the
/// exchange and the others receive its outcome.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tradestation_rs::auth::{Credentials, HttpTokenEndpoint, TokenManager};
/// use std::time::Duration;
///
/// # async fn example(code: &str) -> tradestation_rs::Result<()> {
/// let credentials = Credentials::new("client-id", "secret", "http://localhost:3000");
/// let endpoint = HttpTokenEndpoint::new(Duration::from_secs(30))?;
/// let manager = TokenManager::new(credentials, Arc::new(endpoint));
///
/// manager.initialize(code).await?;
/// let token = manager.get_valid_token().await?;
/// # Ok(())
/// # }
/// ```
pub struct TokenManager {
    credentials: Credentials,
    endpoint: Arc<dyn TokenEndpoint>,
    state: RwLock<AuthState>,
    /// Held for the duration of every exchange. Holds the error of the
    /// last completed refresh so waiters can share it.
    gate: Mutex<Option<AuthError>>,
    /// Bumped, under the gate, whenever a refresh completes or the state
    /// is replaced.
    epoch: AtomicU64,
    safety_margin: chrono::Duration,
    timeout: Duration,
}

#[derive(Clone)]
enum AuthState {
    Unauthenticated,
    Authenticated(TokenState),
}

impl TokenManager {
    /// Create an unauthenticated manager with the default safety margin
    /// and exchange timeout.
    pub fn new(credentials: Credentials, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self {
            credentials,
            endpoint,
            state: RwLock::new(AuthState::Unauthenticated),
            gate: Mutex::new(None),
            epoch: AtomicU64::new(0),
            safety_margin: to_chrono(DEFAULT_SAFETY_MARGIN),
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    /// Create a manager talking to the token URL in `config`, using its
    /// timeout and refresh margin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the timeout is zero.
    pub fn from_config(credentials: Credentials, config: &ClientConfig) -> crate::Result<Self> {
        if config.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }
        let endpoint = HttpTokenEndpoint::with_url(&config.token_url, config.timeout)?;

        Ok(Self::new(credentials, Arc::new(endpoint))
            .with_safety_margin(config.refresh_margin)
            .with_timeout(config.timeout))
    }

    /// Set the minimum remaining lifetime a token must have to be handed
    /// out without refreshing.
    ///
    /// Tokens whose whole lifetime is not longer than the margin are
    /// refreshed at half their lifetime instead.
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = to_chrono(margin);
        self
    }

    /// Set the bound on each token exchange.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start out authenticated with an already known token state.
    pub fn with_token_state(mut self, state: TokenState) -> Self {
        *self.state.get_mut() = AuthState::Authenticated(state);
        self
    }

    /// Exchange an authorization code for the initial token pair.
    ///
    /// On success the manager is authenticated with the returned state.
    /// On failure the previous state is left untouched.
    pub async fn initialize(&self, authorization_code: &str) -> Result<TokenState, AuthError> {
        self.establish(TokenGrant::AuthorizationCode {
            code: authorization_code,
        })
        .await
    }

    /// Authenticate from a refresh token obtained earlier, without going
    /// through the browser flow.
    pub async fn initialize_from_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenState, AuthError> {
        self.establish(TokenGrant::RefreshToken { refresh_token }).await
    }

    /// Get an access token that stays valid for at least the safety
    /// margin, refreshing first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] before initialization or
    /// after a terminal refresh failure, and the refresh error itself when
    /// the refresh this call triggered (or waited on) failed.
    pub async fn get_valid_token(&self) -> Result<String, AuthError> {
        let observed = self.epoch.load(Ordering::Acquire);
        if let Some(token) = self.usable_token().await? {
            return Ok(token);
        }

        let mut last_error = self.gate.lock().await;

        let usable = self.usable_token().await;
        if let Ok(Some(token)) = &usable {
            return Ok(token.clone());
        }
        // Someone else refreshed while we waited for the gate.
        if self.epoch.load(Ordering::Acquire) != observed {
            if let Some(err) = last_error.as_ref() {
                return Err(err.clone());
            }
        }
        usable?;

        let state = self.refresh_locked(&mut last_error).await?;
        Ok(state.access_token().to_string())
    }

    /// Exchange the refresh token for a new token pair, unconditionally.
    ///
    /// The stored state is replaced in one step; readers see either the
    /// old or the new pair.
    pub async fn refresh(&self) -> Result<TokenState, AuthError> {
        let mut last_error = self.gate.lock().await;
        self.refresh_locked(&mut last_error).await
    }

    /// Drop the current tokens.
    pub async fn sign_out(&self) {
        let mut last_error = self.gate.lock().await;
        *self.state.write().await = AuthState::Unauthenticated;
        *last_error = None;
        self.epoch.fetch_add(1, Ordering::AcqRel);
        tracing::info!("Signed out of TradeStation session");
    }

    /// Check whether a token pair is held.
    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, AuthState::Authenticated(_))
    }

    /// Get the expiry of the current access token, if authenticated.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token_state().await.map(|s| s.expires_at())
    }

    /// Get a snapshot of the current token state, if authenticated.
    pub async fn token_state(&self) -> Option<TokenState> {
        match &*self.state.read().await {
            AuthState::Authenticated(state) => Some(state.clone()),
            AuthState::Unauthenticated => None,
        }
    }

    /// The credentials this manager authenticates with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The configured safety margin.
    pub fn safety_margin(&self) -> Duration {
        self.safety_margin.to_std().unwrap_or_default()
    }

    async fn usable_token(&self) -> Result<Option<String>, AuthError> {
        match &*self.state.read().await {
            AuthState::Unauthenticated => Err(AuthError::NotAuthenticated),
            AuthState::Authenticated(state) if state.expires_within(self.margin_for(state)) => {
                Ok(None)
            }
            AuthState::Authenticated(state) => Ok(Some(state.access_token().to_string())),
        }
    }

    /// The margin applied to `state`: the configured one, or half the
    /// granted lifetime when that lifetime does not exceed it.
    fn margin_for(&self, state: &TokenState) -> chrono::Duration {
        match state.lifetime() {
            Some(lifetime) if lifetime <= self.safety_margin => lifetime / 2,
            _ => self.safety_margin,
        }
    }

    fn warn_if_short_lived(&self, state: &TokenState) {
        if let Some(lifetime) = state.lifetime().filter(|l| *l <= self.safety_margin) {
            tracing::warn!(
                lifetime_secs = lifetime.num_seconds(),
                margin_secs = self.safety_margin.num_seconds(),
                "Token lifetime does not exceed the safety margin; refreshing at half its lifetime"
            );
        }
    }

    async fn establish(&self, grant: TokenGrant<'_>) -> Result<TokenState, AuthError> {
        let mut last_error = self.gate.lock().await;

        let previous_refresh = match grant {
            TokenGrant::RefreshToken { refresh_token } => Some(refresh_token),
            TokenGrant::AuthorizationCode { .. } => None,
        };
        let state = self
            .exchange(grant)
            .await
            .and_then(|response| TokenState::from_response(response, previous_refresh))?;

        self.warn_if_short_lived(&state);
        *self.state.write().await = AuthState::Authenticated(state.clone());
        *last_error = None;
        self.epoch.fetch_add(1, Ordering::AcqRel);

        tracing::info!(
            grant_type = grant.grant_type(),
            expires_at = %state.expires_at(),
            "Authenticated with TradeStation"
        );
        Ok(state)
    }

    /// Refresh while holding the gate. Records the outcome for waiters.
    async fn refresh_locked(
        &self,
        last_error: &mut Option<AuthError>,
    ) -> Result<TokenState, AuthError> {
        let current = self
            .token_state()
            .await
            .ok_or(AuthError::NotAuthenticated)?;

        tracing::debug!(expires_at = %current.expires_at(), "Refreshing access token");

        let outcome = self
            .exchange(TokenGrant::RefreshToken {
                refresh_token: current.refresh_token(),
            })
            .await
            .and_then(|response| {
                TokenState::from_response(response, Some(current.refresh_token()))
            });

        let result = match outcome {
            Ok(state) => {
                self.warn_if_short_lived(&state);
                *self.state.write().await = AuthState::Authenticated(state.clone());
                *last_error = None;
                tracing::info!(expires_at = %state.expires_at(), "Access token refreshed");
                Ok(state)
            }
            Err(err) => {
                if err.is_terminal() {
                    *self.state.write().await = AuthState::Unauthenticated;
                    tracing::warn!(error = %err, "Token refresh failed; re-authorization required");
                } else {
                    tracing::warn!(error = %err, "Token refresh failed; keeping current token");
                }
                *last_error = Some(err.clone());
                Err(err)
            }
        };
        self.epoch.fetch_add(1, Ordering::AcqRel);
        result
    }

    async fn exchange(
        &self,
        grant: TokenGrant<'_>,
    ) -> Result<super::TokenResponse, AuthError> {
        tokio::time::timeout(self.timeout, self.endpoint.exchange(&self.credentials, grant))
            .await
            .map_err(|_| AuthError::NetworkTimeout)?
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(365))
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("credentials", &self.credentials)
            .field("tokens", &"[REDACTED]")
            .field("safety_margin", &self.safety_margin)
            .field("timeout", &self.timeout)
            .finish()
    }
}
