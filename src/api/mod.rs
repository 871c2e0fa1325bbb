//! WeChat Work API modules
//!
//! - [`common`] - Shared response primitives
//! - [`menu`] - Application menus
//! - [`tag`] - Tags and tag membership
//! - [`user`] - Members, department listings and OAuth
//! - [`ip`] - Callback server addresses
//! - [`agent`] - Application settings
//!
//! Every group is built over one shared [`WechatContext`]; groups defined
//! outside this crate plug in through [`ApiExtension`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wechat_work_sdk::{WechatWork, types::{CorpId, CorpSecret}};
//! ```

pub mod agent;
pub mod common;
pub mod ip;
pub mod menu;
pub mod tag;
pub mod r#trait;
pub mod user;

pub use agent::{AgentApi, AgentDetail, AgentSettings, AgentSummary, ListAgentsResponse};
pub use common::ApiResponseBase;
pub use ip::{CallbackIpResponse, IpApi};
pub use menu::{GetMenuResponse, Menu, MenuApi, MenuButton};
pub use r#trait::{ApiExtension, WechatApi, WechatContext};
pub use tag::{
    CreateTagResponse, ListTagsResponse, Tag, TagApi, TagUser, TagUsersChangeResponse,
    TagUsersResponse,
};
pub use user::{
    authorize_url, DepartmentUsersDetailResponse, DepartmentUsersResponse, InviteResponse,
    SimpleUser, User, UserApi, UserDetail, UserIdByCodeResponse,
};
