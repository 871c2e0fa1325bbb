//! Unified WeChat Work client

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::agent::{AgentApi, AgentDetail, AgentSettings, ListAgentsResponse};
use crate::api::common::ApiResponseBase;
use crate::api::ip::{CallbackIpResponse, IpApi};
use crate::api::menu::{GetMenuResponse, Menu, MenuApi};
use crate::api::tag::{
    CreateTagResponse, ListTagsResponse, TagApi, TagUsersChangeResponse, TagUsersResponse,
};
use crate::api::user::{
    DepartmentUsersDetailResponse, DepartmentUsersResponse, InviteResponse, User, UserApi,
    UserDetail, UserIdByCodeResponse,
};
use crate::api::{ApiExtension, WechatContext};
use crate::error::WechatError;
use crate::pipeline::RequestPipeline;
use crate::types::{RequestOptions, ResponseBody};

use super::builder::WechatWorkBuilder;

pub(crate) type ExtensionMap = HashMap<&'static str, Arc<dyn Any + Send + Sync>>;

/// Unified WeChat Work client
///
/// This is the main entry point for the SDK. Every API group shares one
/// token manager, so a token refreshed by any call is reused by all others.
///
/// # Example
///
/// ```rust,no_run
/// use wechat_work_sdk::WechatWork;
/// use wechat_work_sdk::types::{CorpId, CorpSecret};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let wechat = WechatWork::builder()
///         .corp_id(CorpId::new("ww1234567890abcdef")?)
///         .secret(CorpSecret::new("your_secret")?)
///         .build()?;
///
///     let tags = wechat.list_tags().await?;
///     for tag in tags.taglist {
///         println!("{}: {}", tag.tagid, tag.tagname);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WechatWork {
    context: Arc<WechatContext>,
    extensions: Arc<ExtensionMap>,
}

impl std::fmt::Debug for WechatWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatWork")
            .field("corp_id", &self.corp_id())
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl WechatWork {
    pub fn builder() -> WechatWorkBuilder {
        WechatWorkBuilder::default()
    }

    pub(crate) fn from_parts(context: Arc<WechatContext>, extensions: ExtensionMap) -> Self {
        Self {
            context,
            extensions: Arc::new(extensions),
        }
    }

    pub fn corp_id(&self) -> &str {
        self.context.client().corp_id()
    }

    /// Shared context, for building API groups by hand.
    pub fn context(&self) -> &Arc<WechatContext> {
        &self.context
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        self.context.pipeline()
    }

    /// Registered extension `E`, or `None` if it was not registered.
    pub fn extension<E: ApiExtension>(&self) -> Option<Arc<E>> {
        self.extensions
            .get(E::NAME)
            .cloned()
            .and_then(|ext| ext.downcast::<E>().ok())
    }

    pub async fn get_access_token(&self) -> Result<String, WechatError> {
        self.context.token_manager().get_token().await
    }

    pub async fn invalidate_token(&self) -> Result<(), WechatError> {
        self.context.token_manager().invalidate().await
    }

    /// Call an arbitrary endpoint through the request pipeline.
    ///
    /// `path` is relative to the base URL, e.g. `/cgi-bin/department/list`.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
        max_retries: u32,
    ) -> Result<ResponseBody, WechatError> {
        self.context.pipeline().call(path, options, max_retries).await
    }

    // Menu API

    pub async fn create_menu(
        &self,
        agentid: i64,
        menu: &Menu,
    ) -> Result<ApiResponseBase, WechatError> {
        MenuApi::new(self.context.clone())
            .create_menu(agentid, menu)
            .await
    }

    pub async fn get_menu(&self, agentid: i64) -> Result<GetMenuResponse, WechatError> {
        MenuApi::new(self.context.clone()).get_menu(agentid).await
    }

    pub async fn remove_menu(&self, agentid: i64) -> Result<ApiResponseBase, WechatError> {
        MenuApi::new(self.context.clone()).remove_menu(agentid).await
    }

    // Tag API

    pub async fn create_tag(&self, name: &str) -> Result<CreateTagResponse, WechatError> {
        TagApi::new(self.context.clone()).create_tag(name).await
    }

    pub async fn update_tag_name(
        &self,
        id: u32,
        name: &str,
    ) -> Result<ApiResponseBase, WechatError> {
        TagApi::new(self.context.clone())
            .update_tag_name(id, name)
            .await
    }

    pub async fn delete_tag(&self, id: u32) -> Result<ApiResponseBase, WechatError> {
        TagApi::new(self.context.clone()).delete_tag(id).await
    }

    pub async fn list_tags(&self) -> Result<ListTagsResponse, WechatError> {
        TagApi::new(self.context.clone()).list_tags().await
    }

    pub async fn get_tag_users(&self, id: u32) -> Result<TagUsersResponse, WechatError> {
        TagApi::new(self.context.clone()).get_tag_users(id).await
    }

    pub async fn add_tag_users(
        &self,
        id: u32,
        user_ids: &[String],
    ) -> Result<TagUsersChangeResponse, WechatError> {
        TagApi::new(self.context.clone())
            .add_tag_users(id, user_ids)
            .await
    }

    pub async fn delete_tag_users(
        &self,
        id: u32,
        user_ids: &[String],
    ) -> Result<TagUsersChangeResponse, WechatError> {
        TagApi::new(self.context.clone())
            .delete_tag_users(id, user_ids)
            .await
    }

    // User API

    pub async fn create_user(&self, user: &User) -> Result<ApiResponseBase, WechatError> {
        UserApi::new(self.context.clone()).create_user(user).await
    }

    pub async fn update_user(&self, user: &User) -> Result<ApiResponseBase, WechatError> {
        UserApi::new(self.context.clone()).update_user(user).await
    }

    pub async fn delete_user(&self, userid: &str) -> Result<ApiResponseBase, WechatError> {
        UserApi::new(self.context.clone()).delete_user(userid).await
    }

    pub async fn get_user(&self, userid: &str) -> Result<UserDetail, WechatError> {
        UserApi::new(self.context.clone()).get_user(userid).await
    }

    pub async fn get_department_users(
        &self,
        department_id: u32,
        fetch_child: bool,
        status: u8,
    ) -> Result<DepartmentUsersResponse, WechatError> {
        UserApi::new(self.context.clone())
            .get_department_users(department_id, fetch_child, status)
            .await
    }

    pub async fn get_department_users_detail(
        &self,
        department_id: u32,
        fetch_child: bool,
        status: u8,
    ) -> Result<DepartmentUsersDetailResponse, WechatError> {
        UserApi::new(self.context.clone())
            .get_department_users_detail(department_id, fetch_child, status)
            .await
    }

    pub async fn invite_user(
        &self,
        userid: &str,
        invite_tips: Option<&str>,
    ) -> Result<InviteResponse, WechatError> {
        UserApi::new(self.context.clone())
            .invite_user(userid, invite_tips)
            .await
    }

    pub async fn get_user_id_by_code(
        &self,
        code: &str,
        agentid: i64,
    ) -> Result<UserIdByCodeResponse, WechatError> {
        UserApi::new(self.context.clone())
            .get_user_id_by_code(code, agentid)
            .await
    }

    /// OAuth authorization page URL for this corp. No request is made.
    pub fn authorize_url(&self, redirect: &str, state: Option<&str>, scope: Option<&str>) -> String {
        crate::api::user::authorize_url(self.corp_id(), redirect, state, scope)
    }

    // IP API

    pub async fn get_callback_ip(&self) -> Result<CallbackIpResponse, WechatError> {
        IpApi::new(self.context.clone()).get_callback_ip().await
    }

    // Agent API

    pub async fn list_agents(&self) -> Result<ListAgentsResponse, WechatError> {
        AgentApi::new(self.context.clone()).list_agents().await
    }

    pub async fn get_agent(&self, agentid: i64) -> Result<AgentDetail, WechatError> {
        AgentApi::new(self.context.clone()).get_agent(agentid).await
    }

    pub async fn set_agent(&self, settings: &AgentSettings) -> Result<ApiResponseBase, WechatError> {
        AgentApi::new(self.context.clone()).set_agent(settings).await
    }
}
