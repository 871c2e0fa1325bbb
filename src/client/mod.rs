//! WeChat Work HTTP Client module
//!
//! This module contains the WechatClient, the unified WechatWork client and
//! its builder.

mod wechat_client;
pub use wechat_client::{WechatClient, WechatClientBuilder};

mod wechat_work;
pub use wechat_work::WechatWork;

mod builder;
pub use builder::{WechatWorkBuilder, BUILTIN_API_NAMES};
