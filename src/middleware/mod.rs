//! Middleware components for the WeChat Work HTTP transport.
//!
//! Middleware wraps the raw `reqwest` exchange using Tower patterns and is
//! installed with
//! [`WechatWorkBuilder::with_middleware`](crate::WechatWorkBuilder::with_middleware).
//! Token handling is not a middleware concern; the request pipeline attaches
//! and refreshes tokens above this layer.
//!
//! ## Middleware Types
//!
//! - [`RetryMiddleware`] - Retries on connect/timeout errors and 5xx
//! - [`LoggingMiddleware`] - Logs request/response information
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tower::layer::util::Stack;
//! use wechat_work_sdk::middleware::{LoggingMiddleware, RetryMiddleware};
//! use wechat_work_sdk::types::{CorpId, CorpSecret};
//! use wechat_work_sdk::WechatWork;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let wechat = WechatWork::builder()
//!     .corp_id(CorpId::new("ww1234567890abcdef")?)
//!     .secret(CorpSecret::new("your_secret")?)
//!     .with_middleware(Stack::new(RetryMiddleware::new(), LoggingMiddleware::new()))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;
mod retry;

pub use logging::{LoggingMiddleware, LoggingMiddlewareService};
pub use retry::{RetryMiddleware, RetryMiddlewareService};
