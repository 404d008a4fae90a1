//! OAuth2 client-credentials token manager
//!
//! One token per process per gateway. The token is fetched on first use and
//! replaced once it nears expiry; concurrent callers that find no valid token
//! queue behind a single exchange instead of each issuing their own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::{Credential, DEFAULT_TOKEN_TIMEOUT};
use crate::gateway::{GatewayError, GatewayResult};
use crate::logging::Logger;

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Subtracted from the declared lifetime so a token is replaced before the
/// server stops accepting it
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

const OPERATION: &str = "oauth2/token";

/// A bearer token and the instant after which it must not be used
pub(crate) struct Token {
    access_token: SecretString,
    expires_at: Instant,
}

impl Token {
    /// Token issued at `now` with a server-declared lifetime in seconds
    fn issued(access_token: String, expires_in: u64, now: Instant) -> Self {
        let usable = Duration::from_secs(expires_in).saturating_sub(EXPIRY_MARGIN);
        Self {
            access_token: SecretString::new(access_token),
            expires_at: now + usable,
        }
    }

    fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

impl TokenResponse {
    /// Some identity providers send `expires_in` as a numeric string
    fn lifetime_secs(&self) -> u64 {
        match &self.expires_in {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .unwrap_or(DEFAULT_EXPIRES_IN),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_EXPIRES_IN),
            _ => DEFAULT_EXPIRES_IN,
        }
    }
}

/// Holds the cached token for one credential
pub struct TokenManager {
    credential: Credential,
    http: reqwest::Client,
    timeout: Duration,
    cached: RwLock<Option<Token>>,
    /// Serializes exchanges and holds the failure of the last one
    refresh: Mutex<Option<GatewayError>>,
    /// Completed exchanges, successful or not
    exchanges: AtomicU64,
    logger: Arc<dyn Logger>,
}

impl TokenManager {
    pub fn new(credential: Credential, logger: Arc<dyn Logger>) -> Self {
        Self::with_client(credential, reqwest::Client::new(), DEFAULT_TOKEN_TIMEOUT, logger)
    }

    /// Share an HTTP client and choose the exchange timeout
    pub fn with_client(
        credential: Credential,
        http: reqwest::Client,
        timeout: Duration,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            credential,
            http,
            timeout,
            cached: RwLock::new(None),
            refresh: Mutex::new(None),
            exchanges: AtomicU64::new(0),
            logger,
        }
    }

    /// Current access token, exchanging credentials first if needed
    ///
    /// Returns without awaiting anything while the cached token is valid.
    /// Callers that queue behind an exchange get its outcome, failure
    /// included, instead of starting another one.
    pub async fn get_token(&self) -> GatewayResult<String> {
        if let Some(token) = self.valid_cached(Instant::now()) {
            return Ok(token);
        }

        let seen = self.exchanges.load(Ordering::Acquire);
        let mut last_failure = self.refresh.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = self.valid_cached(Instant::now()) {
            self.logger.debug("[TokenManager] Using token refreshed by a concurrent caller");
            return Ok(token);
        }
        if self.exchanges.load(Ordering::Acquire) != seen {
            if let Some(err) = last_failure.as_ref() {
                self.logger.debug("[TokenManager] Sharing failure of a concurrent exchange");
                return Err(err.clone());
            }
        }

        let outcome = self.exchange().await;
        self.exchanges.fetch_add(1, Ordering::AcqRel);
        match outcome {
            Ok(token) => {
                *last_failure = None;
                let access_token = token.access_token.expose_secret().clone();
                *self.cached.write() = Some(token);
                Ok(access_token)
            }
            Err(err) => {
                *last_failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Whether a usable token is cached right now
    pub fn has_valid_token(&self) -> bool {
        self.valid_cached(Instant::now()).is_some()
    }

    fn valid_cached(&self, now: Instant) -> Option<String> {
        self.cached
            .read()
            .as_ref()
            .filter(|t| t.is_valid_at(now))
            .map(|t| t.access_token.expose_secret().clone())
    }

    async fn exchange(&self) -> GatewayResult<Token> {
        self.logger.info(&format!(
            "[TokenManager] Requesting access token from {}",
            self.credential.token_endpoint()
        ));

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credential.client_id()),
            ("client_secret", self.credential.client_secret()),
        ];

        let issued_at = Instant::now();
        let response = self
            .http
            .post(self.credential.token_endpoint())
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.fail(GatewayError::from_reqwest(e, OPERATION, self.timeout)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.fail(GatewayError::Authentication {
                status: status.as_u16(),
                body,
            }));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| self.fail(GatewayError::from_reqwest(e, OPERATION, self.timeout)))?;

        let lifetime = body.lifetime_secs();
        self.logger.info(&format!(
            "[TokenManager] Access token issued, expires in {}s",
            lifetime
        ));

        Ok(Token::issued(body.access_token, lifetime, issued_at))
    }

    fn fail(&self, err: GatewayError) -> GatewayError {
        self.logger.error(&format!("[TokenManager] Token exchange failed: {}", err));
        err
    }
}
