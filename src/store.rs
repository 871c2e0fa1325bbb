//! Token persistence hooks.
//!
//! A [`TokenStore`] is where the [`TokenManager`](crate::token::TokenManager)
//! reads and writes its [`Credential`]. The default [`MemoryTokenStore`] keeps
//! it in process memory, which is enough for a single process.
//!
//! When several processes or machines call the API with the same corp secret,
//! they must share one credential: every refresh issues a new token, and
//! processes refreshing independently waste quota and race each other.
//! Implement [`TokenStore`] over shared storage (database, cache service) and
//! pass it to [`WechatWorkBuilder::token_store`](crate::WechatWorkBuilder::token_store).
//!
//! Machines sharing a store should keep their clocks in sync; expiry is a wall
//! clock instant.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use wechat_work_sdk::store::TokenStore;
//! use wechat_work_sdk::token::Credential;
//! use wechat_work_sdk::WechatError;
//!
//! struct RedisTokenStore { /* connection pool */ }
//!
//! #[async_trait]
//! impl TokenStore for RedisTokenStore {
//!     async fn load(&self) -> Result<Option<Credential>, WechatError> {
//!         // GET wechat_work:access_token and deserialize with serde_json
//!     }
//!
//!     async fn save(&self, credential: Option<Credential>) -> Result<(), WechatError> {
//!         // SET (or DEL when `None`)
//!     }
//! }
//! ```

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::WechatError;
use crate::token::Credential;

/// Load/save hooks for the shared access token.
///
/// Errors should be reported as [`WechatError::Store`]; they propagate to the
/// caller of the endpoint method.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Return the persisted credential, or `None` when nothing is stored.
    async fn load(&self) -> Result<Option<Credential>, WechatError>;

    /// Persist `credential`; `None` clears the stored value.
    async fn save(&self, credential: Option<Credential>) -> Result<(), WechatError>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<Credential>, WechatError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, credential: Option<Credential>) -> Result<(), WechatError> {
        if credential.is_some() {
            log::debug!(
                "[WechatWork] access token kept in process memory; use a shared TokenStore for multi-process deployments"
            );
        }
        *self.inner.write().await = credential;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[tokio::test]
    async fn test_memory_store_starts_empty() {
        let store = MemoryTokenStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_save_and_clear() {
        let store = MemoryTokenStore::new();
        let credential =
            Credential::new("token_abc", SystemTime::now() + Duration::from_secs(60));

        store.save(Some(credential.clone())).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(credential));

        store.save(None).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_with_credential() {
        let credential =
            Credential::new("seeded", SystemTime::now() + Duration::from_secs(60));
        let store = MemoryTokenStore::with_credential(credential);

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token(), "seeded");
    }
}
