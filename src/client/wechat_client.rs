//! WeChat Work HTTP Client
//!
//! Transport layer: builds requests, sends them (optionally through tower
//! middleware) and classifies the responses.

use percent_encoding::utf8_percent_encode;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

use crate::error::WechatError;
use crate::types::{CorpId, CorpSecret, RequestOptions, ResponseBody, ResponseFormat};
use crate::utils::{redact_url, with_query, QUERY_ENCODE_SET};

pub(crate) const DEFAULT_BASE_URL: &str = "https://qyapi.weixin.qq.com";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub(crate) type MiddlewareFuture =
    Pin<Box<dyn Future<Output = Result<reqwest::Response, reqwest::Error>> + Send>>;
pub(crate) type MiddlewareExecutor =
    Arc<dyn Fn(reqwest::Request) -> MiddlewareFuture + Send + Sync>;

/// WeChat Work API Client
///
/// Reusable HTTP client for calling WeChat Work APIs.
/// Built with reqwest for async HTTP requests.
#[derive(Clone)]
pub struct WechatClient {
    http: Client,
    corp_id: CorpId,
    secret: Option<CorpSecret>,
    base_url: String,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for WechatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatClient")
            .field("corp_id", &self.corp_id)
            .field("base_url", &self.base_url)
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl WechatClient {
    /// Create a new client builder
    pub fn builder() -> WechatClientBuilder {
        WechatClientBuilder::default()
    }

    /// Get the corp id
    pub fn corp_id(&self) -> &str {
        self.corp_id.as_str()
    }

    /// Get the corp secret, if this client may request tokens itself
    pub(crate) fn secret(&self) -> Option<&str> {
        self.secret.as_ref().map(CorpSecret::as_str)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn append_access_token(path: &str, access_token: &str) -> String {
        let encoded = utf8_percent_encode(access_token, QUERY_ENCODE_SET);

        if path.contains("access_token={}") {
            return path.replacen("access_token={}", &format!("access_token={encoded}"), 1);
        }

        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{path}{separator}access_token={encoded}")
    }

    /// Returns the underlying [`reqwest::Client`] for raw HTTP requests.
    ///
    /// Note: requests made through this client bypass the middleware pipeline.
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn with_middleware_executor(mut self, executor: MiddlewareExecutor) -> Self {
        self.middleware_executor = Some(executor);
        self
    }

    pub(crate) async fn send_request(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    /// Send one request to `path` (relative to the base URL, query included)
    /// and classify the response.
    ///
    /// # Errors
    /// - `WechatError::Transport` when no response was received
    /// - `WechatError::HttpStatus` for a status outside 200..=204
    /// - `WechatError::Decode` when a JSON body does not parse
    /// - `WechatError::Api` when the body carries a non-zero `errcode`
    pub async fn execute(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<ResponseBody, WechatError> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http
            .request(options.effective_method(), &url)
            .headers(options.headers.clone());
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let response = self.send_request(builder.build()?).await?;

        let status = response.status().as_u16();
        if !(200..=204).contains(&status) {
            return Err(WechatError::HttpStatus {
                status,
                url: redact_url(&url),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let decode_json = match options.effective_format() {
            ResponseFormat::Auto => content_type.contains("application/json"),
            ResponseFormat::Json => true,
            ResponseFormat::Raw => false,
        };

        let bytes = response.bytes().await?;
        // 204 and other empty bodies carry nothing to decode.
        if !decode_json || bytes.is_empty() {
            return Ok(ResponseBody::Raw(bytes.to_vec()));
        }

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            WechatError::Decode(format!("invalid JSON from {}: {}", redact_url(&url), e))
        })?;

        if let Some(errcode) = value.get("errcode").and_then(|v| v.as_i64()) {
            let errmsg = value
                .get("errmsg")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            WechatError::check_api(errcode.try_into().unwrap_or(i32::MAX), errmsg)?;
        }

        Ok(ResponseBody::Json(value))
    }

    /// Make a GET request without an access token and decode the JSON body
    ///
    /// # Arguments
    /// * `path` - API endpoint path (e.g., "/cgi-bin/gettoken")
    /// * `query` - Query parameters as key-value pairs
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WechatError> {
        let options = RequestOptions::get().response_format(ResponseFormat::Json);
        self.execute(&with_query(path, query), &options)
            .await?
            .into_json()
    }
}

impl Service<reqwest::Request> for WechatClient {
    type Response = reqwest::Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: reqwest::Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

/// Builder for WechatClient
///
/// # Example
///
/// ```rust
/// use wechat_work_sdk::client::WechatClient;
/// use wechat_work_sdk::types::{CorpId, CorpSecret};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WechatClient::builder()
///         .corp_id(CorpId::new("ww1234567890abcdef")?)
///         .secret(CorpSecret::new("corp_secret")?)
///         .build()?;
///
///     assert_eq!(client.corp_id(), "ww1234567890abcdef");
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct WechatClientBuilder {
    corp_id: Option<CorpId>,
    secret: Option<CorpSecret>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl WechatClientBuilder {
    /// Set the WeChat Work corp id
    pub fn corp_id(mut self, corp_id: CorpId) -> Self {
        self.corp_id = Some(corp_id);
        self
    }

    /// Set the corp secret used to request access tokens
    pub fn secret(mut self, secret: CorpSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    pub(crate) fn secret_opt(mut self, secret: Option<CorpSecret>) -> Self {
        self.secret = secret;
        self
    }

    /// Set the base URL for API calls
    ///
    /// Default: `<https://qyapi.weixin.qq.com>`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the total timeout for requests
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the WechatClient
    ///
    /// The secret is optional here; a client without one can only use
    /// credentials provided by a shared token store.
    ///
    /// # Errors
    /// Returns an error if the corp id is not set or the base URL is malformed
    pub fn build(self) -> Result<WechatClient, WechatError> {
        let corp_id = self
            .corp_id
            .ok_or_else(|| WechatError::Config("corp_id is required".to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(WechatError::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(WechatClient {
            http: client,
            corp_id,
            secret: self.secret,
            base_url,
            middleware_executor: None,
        })
    }
}
