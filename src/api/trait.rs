//! WeChat Work API traits and context
//!
//! Provides the shared context every API group is built over, the base
//! [`WechatApi`] trait, and [`ApiExtension`] for API groups defined outside
//! this crate.

use std::sync::Arc;

use crate::client::WechatClient;
use crate::pipeline::RequestPipeline;
use crate::token::TokenManager;

/// Context holding shared resources for WeChat Work API implementations.
///
/// All API groups of one [`WechatWork`](crate::WechatWork) share a single
/// context, and therefore a single token manager and request pipeline.
#[derive(Clone)]
pub struct WechatContext {
    pub(crate) pipeline: Arc<RequestPipeline>,
}

impl std::fmt::Debug for WechatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatContext")
            .field("pipeline", &"RequestPipeline { .. }")
            .finish()
    }
}

impl WechatContext {
    /// Create a new WechatContext
    pub fn new(pipeline: Arc<RequestPipeline>) -> Self {
        Self { pipeline }
    }

    /// Get a reference to the request pipeline.
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Get a reference to the WeChat Work HTTP client.
    pub fn client(&self) -> &WechatClient {
        self.pipeline.client()
    }

    /// Get a reference to the token manager.
    pub fn token_manager(&self) -> &TokenManager {
        self.pipeline.token_manager()
    }
}

/// Trait for WeChat Work API implementations.
///
/// All API modules implement this trait to provide access to the shared
/// context.
pub trait WechatApi: Send + Sync {
    /// Get a reference to the WeChat context
    fn context(&self) -> &WechatContext;

    /// Get the name of this API for logging and registration.
    fn api_name(&self) -> &'static str {
        "unknown"
    }
}

/// API group added to a [`WechatWork`](crate::WechatWork) from outside this crate.
///
/// Register with
/// [`WechatWorkBuilder::with_extension`](crate::WechatWorkBuilder::with_extension);
/// registration fails when [`NAME`](Self::NAME) collides with a built-in API
/// group or another extension.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wechat_work_sdk::api::{ApiExtension, WechatApi, WechatContext};
/// use wechat_work_sdk::WechatError;
///
/// pub struct DepartmentApi {
///     context: Arc<WechatContext>,
/// }
///
/// impl DepartmentApi {
///     pub async fn list(&self) -> Result<serde_json::Value, WechatError> {
///         self.context.pipeline().get_json("/cgi-bin/department/list").await
///     }
/// }
///
/// impl WechatApi for DepartmentApi {
///     fn context(&self) -> &WechatContext {
///         &self.context
///     }
///
///     fn api_name(&self) -> &'static str {
///         Self::NAME
///     }
/// }
///
/// impl ApiExtension for DepartmentApi {
///     const NAME: &'static str = "department";
///
///     fn from_context(context: Arc<WechatContext>) -> Self {
///         Self { context }
///     }
/// }
/// ```
pub trait ApiExtension: WechatApi + Sized + 'static {
    /// Unique registration name.
    const NAME: &'static str;

    /// Build the API group over the shared context.
    fn from_context(context: Arc<WechatContext>) -> Self;
}
