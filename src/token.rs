//! Access token management for WeChat Work API
//!
//! Handles token caching, refresh through the `gettoken` authority endpoint,
//! and single-flight coordination between concurrent callers.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::client::WechatClient;
use crate::error::WechatError;
use crate::store::{MemoryTokenStore, TokenStore};

/// Seconds subtracted from the vendor TTL to absorb clock and network skew.
pub const SAFETY_MARGIN_SECS: u64 = 10;

const TOKEN_PATH: &str = "/cgi-bin/gettoken";

/// An access token together with the instant it stops being usable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    access_token: String,
    expires_at: SystemTime,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expires_at: SystemTime) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Build a credential from a vendor `expires_in`, applying the safety margin.
    ///
    /// A TTL at or below the margin yields `expires_at == issued_at`, which is
    /// never valid.
    pub fn from_ttl(access_token: impl Into<String>, ttl_secs: u64, issued_at: SystemTime) -> Self {
        let lifetime = Duration::from_secs(ttl_secs.saturating_sub(SAFETY_MARGIN_SECS));
        Self::new(access_token, issued_at + lifetime)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(SystemTime::now())
    }

    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        !self.access_token.is_empty() && now < self.expires_at
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.expires_at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Manages access_token lifecycle with automatic refresh
pub struct TokenManager {
    client: Arc<WechatClient>,
    store: Arc<dyn TokenStore>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("corp_id", &self.client.corp_id())
            .field("owns_refresh", &self.owns_refresh())
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Token manager keeping its credential in process memory.
    pub fn new(client: Arc<WechatClient>) -> Self {
        Self::with_store(client, Arc::new(MemoryTokenStore::new()))
    }

    pub fn with_store(client: Arc<WechatClient>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Whether this manager may request new tokens from the authority.
    ///
    /// False when the client has no corp secret and relies on credentials
    /// written to the shared store by another process.
    pub fn owns_refresh(&self) -> bool {
        self.client.secret().is_some()
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Return the stored credential when valid, refreshing otherwise.
    ///
    /// Concurrent callers that find no valid credential wait on one refresh.
    pub async fn get_valid_credential(&self) -> Result<Credential, WechatError> {
        if let Some(credential) = self.load_valid().await? {
            return Ok(credential);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(credential) = self.load_valid().await? {
            debug!("[WechatWork] adopting access token refreshed by another caller");
            return Ok(credential);
        }

        self.fetch_and_store().await
    }

    /// Convenience wrapper returning only the token value.
    pub async fn get_token(&self) -> Result<String, WechatError> {
        Ok(self.get_valid_credential().await?.access_token)
    }

    /// Unconditionally request a new token from the authority.
    pub async fn refresh(&self) -> Result<Credential, WechatError> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Replace `stale_token` after the vendor reported it invalid or expired.
    ///
    /// If a concurrent caller already stored a different valid token, that one
    /// is returned and the authority is not called again.
    pub async fn force_refresh(&self, stale_token: &str) -> Result<Credential, WechatError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(credential) = self.load_valid().await? {
            if credential.access_token != stale_token {
                debug!("[WechatWork] stale access token already replaced");
                return Ok(credential);
            }
        }

        self.store.save(None).await?;
        self.fetch_and_store().await
    }

    /// Clear the stored credential so the next call refreshes.
    pub async fn invalidate(&self) -> Result<(), WechatError> {
        self.store.save(None).await
    }

    async fn load_valid(&self) -> Result<Option<Credential>, WechatError> {
        Ok(self.store.load().await?.filter(Credential::is_valid))
    }

    async fn fetch_and_store(&self) -> Result<Credential, WechatError> {
        let secret = self.client.secret().ok_or_else(|| {
            WechatError::Token(
                "no valid access token in the token store and no corp secret configured"
                    .to_string(),
            )
        })?;

        debug!(
            "[WechatWork] requesting access token for corp {}",
            self.client.corp_id()
        );
        let query = [("corpid", self.client.corp_id()), ("corpsecret", secret)];
        let response: TokenResponse = self
            .client
            .get(TOKEN_PATH, &query)
            .await
            .map_err(|err| match err {
                WechatError::HttpStatus { status, url } => {
                    WechatError::AuthorityStatus { status, url }
                }
                other => other,
            })?;

        if response.access_token.is_empty() {
            return Err(WechatError::Token(
                "authority returned an empty access_token".to_string(),
            ));
        }

        let credential =
            Credential::from_ttl(response.access_token, response.expires_in, SystemTime::now());
        if !credential.is_valid() {
            warn!(
                "[WechatWork] access token expires_in={}s is within the {}s safety margin",
                response.expires_in, SAFETY_MARGIN_SECS
            );
        }

        self.store.save(Some(credential.clone())).await?;
        debug!(
            "[WechatWork] access token refreshed, valid for {}s",
            credential.remaining().as_secs()
        );
        Ok(credential)
    }
}
