//! Request pipeline shared by every endpoint.
//!
//! Each call merges its options over the instance defaults, attaches a valid
//! access token, sends the request and classifies the response. A vendor
//! error reporting an invalid or expired token triggers a forced refresh and
//! a retry while the retry budget lasts.

use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::WechatClient;
use crate::error::WechatError;
use crate::token::TokenManager;
use crate::types::{RequestOptions, ResponseBody, ResponseFormat};

/// Retry budget used by the typed helpers.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Vendor codes meaning "access token invalid" (40001) and "expired" (42001).
pub const DEFAULT_TOKEN_EXPIRED_CODES: &[i32] = &[40001, 42001];

pub struct RequestPipeline {
    client: Arc<WechatClient>,
    token_manager: Arc<TokenManager>,
    defaults: RequestOptions,
    token_expired_codes: Vec<i32>,
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("client", &self.client)
            .field("defaults", &self.defaults)
            .field("token_expired_codes", &self.token_expired_codes)
            .finish_non_exhaustive()
    }
}

impl RequestPipeline {
    pub fn new(client: Arc<WechatClient>, token_manager: Arc<TokenManager>) -> Self {
        Self {
            client,
            token_manager,
            defaults: RequestOptions::default(),
            token_expired_codes: DEFAULT_TOKEN_EXPIRED_CODES.to_vec(),
        }
    }

    /// Options every call is merged over.
    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the set of vendor codes that trigger a refresh-and-retry.
    pub fn with_token_expired_codes(mut self, codes: Vec<i32>) -> Self {
        self.token_expired_codes = codes;
        self
    }

    pub fn client(&self) -> &WechatClient {
        &self.client
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.token_manager
    }

    pub fn defaults(&self) -> &RequestOptions {
        &self.defaults
    }

    pub fn token_expired_codes(&self) -> &[i32] {
        &self.token_expired_codes
    }

    /// Call `path` (relative to the base URL) with a valid access token.
    ///
    /// `path` may carry a query string and may contain an `access_token={}`
    /// placeholder; otherwise the token is appended as a query parameter.
    ///
    /// # Errors
    /// Transport, status, decode and vendor errors surface unchanged. A vendor
    /// token-expiry code is retried after a forced refresh while `max_retries`
    /// is above zero and this client owns refresh authority.
    pub async fn call(
        &self,
        path: &str,
        options: RequestOptions,
        max_retries: u32,
    ) -> Result<ResponseBody, WechatError> {
        let options = self.defaults.merged(&options);
        let mut retries_left = max_retries;
        let mut credential = self.token_manager.get_valid_credential().await?;

        loop {
            let url = WechatClient::append_access_token(path, credential.access_token());
            match self.client.execute(&url, &options).await {
                Err(err)
                    if err.is_api_code_in(&self.token_expired_codes)
                        && retries_left > 0
                        && self.token_manager.owns_refresh() =>
                {
                    warn!(
                        "[WechatWork] {} rejected access token ({}), refreshing ({} retries left)",
                        path, err, retries_left
                    );
                    retries_left -= 1;
                    credential = self
                        .token_manager
                        .force_refresh(credential.access_token())
                        .await?;
                }
                Err(err) => {
                    debug!("[WechatWork] {} failed: {}", path, err);
                    return Err(err);
                }
                Ok(body) => return Ok(body),
            }
        }
    }

    /// GET `path` and deserialize the JSON payload.
    ///
    /// The body is decoded as JSON whatever content type the vendor declares.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, WechatError> {
        let options = RequestOptions::get().response_format(ResponseFormat::Json);
        self.call(path, options, DEFAULT_MAX_RETRIES)
            .await?
            .into_json()
    }

    /// POST `body` as JSON to `path` and deserialize the JSON payload.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, WechatError> {
        let options = RequestOptions::post_json(body)?.response_format(ResponseFormat::Json);
        self.call(path, options, DEFAULT_MAX_RETRIES)
            .await?
            .into_json()
    }
}
