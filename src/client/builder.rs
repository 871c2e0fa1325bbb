use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::{Request as ReqwestRequest, Response as ReqwestResponse};
use tower::{Layer, Service};

use crate::api::{ApiExtension, WechatContext};
use crate::error::WechatError;
use crate::pipeline::{RequestPipeline, DEFAULT_TOKEN_EXPIRED_CODES};
use crate::store::TokenStore;
use crate::token::TokenManager;
use crate::types::{CorpId, CorpSecret, RequestOptions};

use super::wechat_client::{MiddlewareExecutor, MiddlewareFuture, WechatClient};
use super::wechat_work::{ExtensionMap, WechatWork};

/// Names of the API groups every [`WechatWork`] carries.
pub const BUILTIN_API_NAMES: &[&str] = &["menu", "tag", "user", "ip", "agent"];

type ExtensionFactory = fn(Arc<WechatContext>) -> Arc<dyn Any + Send + Sync>;

/// Builder for [`WechatWork`]
///
/// A corp id is always required. A corp secret is required unless a shared
/// [`TokenStore`] is supplied, in which case the client only consumes tokens
/// another process writes there.
#[must_use]
#[derive(Default)]
pub struct WechatWorkBuilder<M = ()> {
    corp_id: Option<CorpId>,
    secret: Option<CorpSecret>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    token_store: Option<Arc<dyn TokenStore>>,
    default_options: Option<RequestOptions>,
    token_expired_codes: Option<Vec<i32>>,
    extensions: Vec<(&'static str, ExtensionFactory)>,
    middleware: Option<M>,
}

impl<M> std::fmt::Debug for WechatWorkBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatWorkBuilder")
            .field("corp_id", &self.corp_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("token_store", &self.token_store.as_ref().map(|_| ".."))
            .field("default_options", &self.default_options)
            .field("token_expired_codes", &self.token_expired_codes)
            .field(
                "extensions",
                &self.extensions.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .field("middleware", &self.middleware.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl<M> WechatWorkBuilder<M> {
    pub fn corp_id(mut self, corp_id: CorpId) -> Self {
        self.corp_id = Some(corp_id);
        self
    }

    pub fn secret(mut self, secret: CorpSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Persist credentials through `store` instead of process memory.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Options merged under every call's own options.
    pub fn default_options(mut self, options: RequestOptions) -> Self {
        self.default_options = Some(options);
        self
    }

    /// Vendor codes that trigger a token refresh and retry.
    ///
    /// Default: `[40001, 42001]`
    pub fn token_expired_codes(mut self, codes: impl Into<Vec<i32>>) -> Self {
        self.token_expired_codes = Some(codes.into());
        self
    }

    /// Register an API group defined outside this crate.
    ///
    /// Retrieve it after building with [`WechatWork::extension`].
    pub fn with_extension<E: ApiExtension>(mut self) -> Self {
        let factory: ExtensionFactory =
            |context| Arc::new(E::from_context(context)) as Arc<dyn Any + Send + Sync>;
        self.extensions.push((E::NAME, factory));
        self
    }

    pub fn with_middleware<M2>(self, middleware: M2) -> WechatWorkBuilder<M2>
    where
        M2: Layer<WechatClient> + Clone + Send + Sync + 'static,
    {
        WechatWorkBuilder {
            corp_id: self.corp_id,
            secret: self.secret,
            base_url: self.base_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            token_store: self.token_store,
            default_options: self.default_options,
            token_expired_codes: self.token_expired_codes,
            extensions: self.extensions,
            middleware: Some(middleware),
        }
    }

    /// Build the client.
    ///
    /// # Errors
    /// `WechatError::Config` when the corp id is missing, when neither a
    /// secret nor a token store is given, when the base URL is malformed, or
    /// when an extension name is already taken.
    pub fn build(self) -> Result<WechatWork, WechatError>
    where
        M: Layer<WechatClient> + Clone + Send + Sync + 'static,
        M::Service: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <M::Service as Service<ReqwestRequest>>::Future: Send + 'static,
    {
        let corp_id = self
            .corp_id
            .ok_or_else(|| WechatError::Config("corp_id is required".to_string()))?;

        if self.secret.is_none() && self.token_store.is_none() {
            return Err(WechatError::Config(
                "secret is required unless a shared token store is supplied".to_string(),
            ));
        }

        let mut seen: Vec<&'static str> = BUILTIN_API_NAMES.to_vec();
        for (name, _) in &self.extensions {
            if seen.contains(name) {
                return Err(WechatError::Config(format!(
                    "extension name already registered: {}",
                    name
                )));
            }
            seen.push(*name);
        }

        let mut client_builder = WechatClient::builder()
            .corp_id(corp_id)
            .secret_opt(self.secret);
        if let Some(base_url) = self.base_url {
            client_builder = client_builder.base_url(base_url);
        }
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            client_builder = client_builder.connect_timeout(connect_timeout);
        }
        let mut client = client_builder.build()?;

        if let Some(middleware) = self.middleware {
            let service = middleware.layer(client.clone());
            let executor = make_middleware_executor(service);
            client = client.with_middleware_executor(executor);
        }

        let client = Arc::new(client);
        let token_manager = Arc::new(match self.token_store {
            Some(store) => TokenManager::with_store(client.clone(), store),
            None => TokenManager::new(client.clone()),
        });

        let pipeline = RequestPipeline::new(client, token_manager)
            .with_defaults(self.default_options.unwrap_or_default())
            .with_token_expired_codes(
                self.token_expired_codes
                    .unwrap_or_else(|| DEFAULT_TOKEN_EXPIRED_CODES.to_vec()),
            );
        let context = Arc::new(WechatContext::new(Arc::new(pipeline)));

        let mut extensions: ExtensionMap = HashMap::new();
        for (name, factory) in self.extensions {
            debug!("[WechatWork] registering extension {}", name);
            extensions.insert(name, factory(context.clone()));
        }

        Ok(WechatWork::from_parts(context, extensions))
    }
}

fn make_middleware_executor<S>(service: S) -> MiddlewareExecutor
where
    S: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    let service = Arc::new(service);

    Arc::new(move |request: ReqwestRequest| -> MiddlewareFuture {
        let mut service = (*service).clone();
        Box::pin(async move { service.call(request).await })
    })
}
