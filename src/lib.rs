//! WeChat Work (Enterprise WeChat) SDK for Rust
//!
//! An async client for the WeChat Work server-side HTTP API. Every call goes
//! through one request pipeline that attaches a cached access token and
//! transparently refreshes it when the vendor reports it invalid or expired.
//!
//! ## API Coverage
//!
//! | Category | Endpoints |
//! |----------|-----------|
//! | Access Token | 1 |
//! | Application Menu | 3 |
//! | Tags | 7 |
//! | Members | 8 |
//! | OAuth URL | 1 (local) |
//! | Callback IP | 1 |
//! | Applications | 3 |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wechat_work_sdk::{WechatWork, types::{CorpId, CorpSecret}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wechat = WechatWork::builder()
//!         .corp_id(CorpId::new("ww1234567890abcdef")?)
//!         .secret(CorpSecret::new("your_secret")?)
//!         .build()?;
//!
//!     let user = wechat.get_user("zhangsan").await?;
//!     println!("{} is in departments {:?}", user.name, user.department);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Sharing tokens between processes
//!
//! Access tokens are rate limited per corp. Processes that share a corp
//! secret should share one [`store::TokenStore`] (Redis, a database row, a
//! file); see the [`store`] module. A client built with a store and no secret
//! never requests tokens itself and only reads what the store provides.
//!
//! ## Modules
//!
//! - [`api`] - WeChat Work API groups (menu, tag, user, ip, agent) and extensions
//! - [`client`] - HTTP client and the unified [`WechatWork`] client
//! - [`error`] - Error types
//! - [`middleware`] - Tower middleware for the HTTP transport
//! - [`pipeline`] - Token-attaching request pipeline with retry on expiry
//! - [`store`] - Pluggable credential persistence
//! - [`token`] - Access token management
//! - [`types`] - Identifiers, request options and response bodies
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! use wechat_work_sdk::WechatError;
//!
//! match result {
//!     Ok(response) => { /* handle success */ }
//!     Err(WechatError::Api { code, message }) => {
//!         eprintln!("API error: {} - {}", code, message);
//!     }
//!     Err(WechatError::Transport(e)) => {
//!         eprintln!("HTTP error: {}", e);
//!     }
//!     Err(e) => {
//!         eprintln!("Other error: {}", e);
//!     }
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod store;
pub mod token;
pub mod types;
mod utils;

pub use client::{WechatClient, WechatClientBuilder, WechatWork, WechatWorkBuilder};
pub use error::{ErrorKind, WechatError};
