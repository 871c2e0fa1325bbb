//! Member Management API
//!
//! # Endpoints
//!
//! - [`UserApi::create_user`] - Create a member
//! - [`UserApi::update_user`] - Update a member
//! - [`UserApi::delete_user`] - Delete a member
//! - [`UserApi::get_user`] - Get a member
//! - [`UserApi::get_department_users`] - List department members (id and name)
//! - [`UserApi::get_department_users_detail`] - List department members in detail
//! - [`UserApi::invite_user`] - Invite a member to follow the enterprise account
//! - [`UserApi::get_user_id_by_code`] - Resolve an OAuth `code` to a member id
//!
//! [`authorize_url`] builds the OAuth page URL the `code` comes from; it
//! performs no request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::common::ApiResponseBase;
use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::utils::{encode_query_value, with_query};

const AUTHORIZE_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";

/// Scope used when none is given: silent redirect, member id only.
pub const DEFAULT_OAUTH_SCOPE: &str = "snsapi_base";

/// Build the OAuth authorization page URL for `corp_id`.
///
/// `scope` defaults to [`DEFAULT_OAUTH_SCOPE`] and `state` to the empty string.
///
/// ```rust
/// use wechat_work_sdk::api::user::authorize_url;
///
/// let url = authorize_url("wx123", "http://example.com/cb", Some("s1"), None);
/// assert_eq!(
///     url,
///     "https://open.weixin.qq.com/connect/oauth2/authorize?appid=wx123\
///      &redirect_uri=http%3A%2F%2Fexample.com%2Fcb&response_type=code\
///      &scope=snsapi_base&state=s1#wechat_redirect"
/// );
/// ```
pub fn authorize_url(
    corp_id: &str,
    redirect: &str,
    state: Option<&str>,
    scope: Option<&str>,
) -> String {
    format!(
        "{}?appid={}&redirect_uri={}&response_type=code&scope={}&state={}#wechat_redirect",
        AUTHORIZE_URL,
        encode_query_value(corp_id),
        encode_query_value(redirect),
        encode_query_value(scope.unwrap_or(DEFAULT_OAUTH_SCOPE)),
        encode_query_value(state.unwrap_or("")),
    )
}

/// Member record sent to user/create and user/update.
///
/// Only `userid` is always required; unset fields are omitted from the body
/// so an update leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub userid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    /// 1 = male, 2 = female
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weixinid: Option<String>,
    /// 1 = enabled, 0 = disabled (update only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extattr: Option<serde_json::Value>,
}

impl User {
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn department(mut self, department: Vec<u32>) -> Self {
        self.department = Some(department);
        self
    }

    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Member as returned by user/get and user/list
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserDetail {
    pub userid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: Vec<u32>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub gender: Option<u8>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub weixinid: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// 1 = followed, 2 = disabled, 4 = not followed
    #[serde(default)]
    pub status: Option<u8>,
    #[serde(default)]
    pub extattr: Option<serde_json::Value>,
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimpleUser {
    pub userid: String,
    #[serde(default)]
    pub name: String,
}

/// Response from user/simplelist
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepartmentUsersResponse {
    #[serde(default)]
    pub userlist: Vec<SimpleUser>,
}

/// Response from user/list
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepartmentUsersDetailResponse {
    #[serde(default)]
    pub userlist: Vec<UserDetail>,
}

#[derive(Debug, Serialize)]
struct InviteRequest<'a> {
    userid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    invite_tips: Option<&'a str>,
}

/// Response from invite/send
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InviteResponse {
    /// 1 = invited through WeChat, 2 = invited by email
    #[serde(rename = "type", default)]
    pub kind: u8,
}

/// Response from user/getuserinfo
///
/// Members carry `UserId`; visitors outside the enterprise carry `OpenId`.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserIdByCodeResponse {
    #[serde(rename = "UserId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "OpenId", default)]
    pub open_id: Option<String>,
    #[serde(rename = "DeviceId", default)]
    pub device_id: Option<String>,
}

/// Member Management API
pub struct UserApi {
    context: Arc<WechatContext>,
}

impl UserApi {
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// POST /cgi-bin/user/create
    pub async fn create_user(&self, user: &User) -> Result<ApiResponseBase, WechatError> {
        self.context
            .pipeline
            .post_json("/cgi-bin/user/create", user)
            .await
    }

    /// POST /cgi-bin/user/update
    pub async fn update_user(&self, user: &User) -> Result<ApiResponseBase, WechatError> {
        self.context
            .pipeline
            .post_json("/cgi-bin/user/update", user)
            .await
    }

    /// GET /cgi-bin/user/delete?userid=USERID
    pub async fn delete_user(&self, userid: &str) -> Result<ApiResponseBase, WechatError> {
        let path = with_query("/cgi-bin/user/delete", &[("userid", userid)]);
        self.context.pipeline.get_json(&path).await
    }

    /// GET /cgi-bin/user/get?userid=USERID
    pub async fn get_user(&self, userid: &str) -> Result<UserDetail, WechatError> {
        let path = with_query("/cgi-bin/user/get", &[("userid", userid)]);
        self.context.pipeline.get_json(&path).await
    }

    /// List the members of `department_id` (id and name only)
    ///
    /// `status` is a bit set: 0 = all, 1 = followed, 2 = disabled, 4 = not followed.
    ///
    /// GET /cgi-bin/user/simplelist
    pub async fn get_department_users(
        &self,
        department_id: u32,
        fetch_child: bool,
        status: u8,
    ) -> Result<DepartmentUsersResponse, WechatError> {
        let path = department_query("/cgi-bin/user/simplelist", department_id, fetch_child, status);
        self.context.pipeline.get_json(&path).await
    }

    /// Same filter as [`get_department_users`](Self::get_department_users),
    /// full member records.
    ///
    /// GET /cgi-bin/user/list
    pub async fn get_department_users_detail(
        &self,
        department_id: u32,
        fetch_child: bool,
        status: u8,
    ) -> Result<DepartmentUsersDetailResponse, WechatError> {
        let path = department_query("/cgi-bin/user/list", department_id, fetch_child, status);
        self.context.pipeline.get_json(&path).await
    }

    /// POST /cgi-bin/invite/send
    pub async fn invite_user(
        &self,
        userid: &str,
        invite_tips: Option<&str>,
    ) -> Result<InviteResponse, WechatError> {
        let request = InviteRequest {
            userid,
            invite_tips,
        };
        self.context
            .pipeline
            .post_json("/cgi-bin/invite/send", &request)
            .await
    }

    /// GET /cgi-bin/user/getuserinfo?code=CODE&agentid=AGENTID
    pub async fn get_user_id_by_code(
        &self,
        code: &str,
        agentid: i64,
    ) -> Result<UserIdByCodeResponse, WechatError> {
        let agentid = agentid.to_string();
        let path = with_query(
            "/cgi-bin/user/getuserinfo",
            &[("code", code), ("agentid", agentid.as_str())],
        );
        self.context.pipeline.get_json(&path).await
    }

    /// [`authorize_url`] for this client's corp id.
    pub fn authorize_url(&self, redirect: &str, state: Option<&str>, scope: Option<&str>) -> String {
        authorize_url(self.context.client().corp_id(), redirect, state, scope)
    }
}

fn department_query(base: &str, department_id: u32, fetch_child: bool, status: u8) -> String {
    let department_id = department_id.to_string();
    let status = status.to_string();
    with_query(
        base,
        &[
            ("department_id", department_id.as_str()),
            ("fetch_child", if fetch_child { "1" } else { "0" }),
            ("status", status.as_str()),
        ],
    )
}

impl WechatApi for UserApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "user"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_defaults() {
        let url = authorize_url("corp", "http://a.b/c?d=1", None, None);
        assert_eq!(
            url,
            "https://open.weixin.qq.com/connect/oauth2/authorize?appid=corp\
             &redirect_uri=http%3A%2F%2Fa.b%2Fc%3Fd%3D1&response_type=code\
             &scope=snsapi_base&state=#wechat_redirect"
        );
    }

    #[test]
    fn test_authorize_url_custom_scope() {
        let url = authorize_url("corp", "http://a.b/", Some("x y"), Some("snsapi_userinfo"));
        assert!(url.contains("&scope=snsapi_userinfo&"));
        assert!(url.contains("&state=x%20y#wechat_redirect"));
    }

    #[test]
    fn test_user_update_omits_unset_fields() {
        let user = User::new("zhangsan").name("Li Si").department(vec![1]);
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({"userid": "zhangsan", "name": "Li Si", "department": [1]})
        );
    }

    #[test]
    fn test_department_query() {
        assert_eq!(
            department_query("/cgi-bin/user/list", 2, true, 0),
            "/cgi-bin/user/list?department_id=2&fetch_child=1&status=0"
        );
    }

    #[test]
    fn test_user_id_by_code_parsing() {
        let json = r#"{"errcode": 0, "errmsg": "ok", "UserId": "USERID", "DeviceId": "DEVICEID"}"#;
        let response: UserIdByCodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user_id.as_deref(), Some("USERID"));
        assert_eq!(response.device_id.as_deref(), Some("DEVICEID"));
        assert!(response.open_id.is_none());
    }

    #[test]
    fn test_user_detail_parsing() {
        let json = r#"{
            "errcode": 0,
            "errmsg": "ok",
            "userid": "zhangsan",
            "name": "Li Si",
            "department": [1, 2],
            "gender": 1,
            "status": 1,
            "extattr": {"attrs": [{"name": "hobby", "value": "travel"}]}
        }"#;
        let user: UserDetail = serde_json::from_str(json).unwrap();
        assert_eq!(user.department, vec![1, 2]);
        assert_eq!(user.status, Some(1));
        assert_eq!(user.extattr.unwrap()["attrs"][0]["name"], "hobby");
    }
}
