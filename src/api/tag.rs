//! Tag Management API
//!
//! # Endpoints
//!
//! - [`TagApi::create_tag`] - Create a tag
//! - [`TagApi::update_tag_name`] - Rename a tag
//! - [`TagApi::delete_tag`] - Delete a tag
//! - [`TagApi::list_tags`] - List all tags
//! - [`TagApi::get_tag_users`] - Get members of a tag
//! - [`TagApi::add_tag_users`] - Add members to a tag
//! - [`TagApi::delete_tag_users`] - Remove members from a tag
//!
//! Adding or removing members succeeds when only part of the user list is
//! invalid; the rejected ids come back in
//! [`TagUsersChangeResponse::invalidlist`]. Only a fully invalid list fails
//! (vendor code 40031).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::common::{id_from_number_or_string, ApiResponseBase};
use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::utils::with_query;

#[derive(Debug, Serialize)]
struct CreateTagRequest<'a> {
    tagname: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateTagRequest<'a> {
    tagid: u32,
    tagname: &'a str,
}

#[derive(Debug, Serialize)]
struct TagUsersRequest<'a> {
    tagid: u32,
    userlist: &'a [String],
}

/// Response from tag/create
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateTagResponse {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub tagid: u32,
    #[serde(default)]
    pub errmsg: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tag {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub tagid: u32,
    #[serde(default)]
    pub tagname: String,
}

/// Response from tag/list
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListTagsResponse {
    #[serde(default)]
    pub taglist: Vec<Tag>,
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TagUser {
    pub userid: String,
    #[serde(default)]
    pub name: String,
}

/// Response from tag/get
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagUsersResponse {
    #[serde(default)]
    pub tagname: Option<String>,
    #[serde(default)]
    pub userlist: Vec<TagUser>,
    /// Departments attached to the tag
    #[serde(default)]
    pub partylist: Vec<u32>,
}

/// Response from tag/addtagusers and tag/deltagusers
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagUsersChangeResponse {
    #[serde(default)]
    pub errmsg: String,
    /// `|`-separated user ids that were rejected, e.g. `"usr1|usr2"`
    #[serde(default)]
    pub invalidlist: Option<String>,
}

impl TagUsersChangeResponse {
    /// Rejected user ids, split out of [`invalidlist`](Self::invalidlist).
    pub fn invalid_users(&self) -> Vec<&str> {
        self.invalidlist
            .as_deref()
            .map(|list| list.split('|').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Tag Management API
pub struct TagApi {
    context: Arc<WechatContext>,
}

impl TagApi {
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// Create a tag named `name`
    ///
    /// POST /cgi-bin/tag/create
    pub async fn create_tag(&self, name: &str) -> Result<CreateTagResponse, WechatError> {
        let request = CreateTagRequest { tagname: name };
        self.context
            .pipeline
            .post_json("/cgi-bin/tag/create", &request)
            .await
    }

    /// Rename tag `id` (at most 64 characters)
    ///
    /// POST /cgi-bin/tag/update
    pub async fn update_tag_name(
        &self,
        id: u32,
        name: &str,
    ) -> Result<ApiResponseBase, WechatError> {
        let request = UpdateTagRequest {
            tagid: id,
            tagname: name,
        };
        self.context
            .pipeline
            .post_json("/cgi-bin/tag/update", &request)
            .await
    }

    /// Delete tag `id`
    ///
    /// GET /cgi-bin/tag/delete?tagid=ID
    pub async fn delete_tag(&self, id: u32) -> Result<ApiResponseBase, WechatError> {
        let tagid = id.to_string();
        let path = with_query("/cgi-bin/tag/delete", &[("tagid", tagid.as_str())]);
        self.context.pipeline.get_json(&path).await
    }

    /// List all tags
    ///
    /// GET /cgi-bin/tag/list
    pub async fn list_tags(&self) -> Result<ListTagsResponse, WechatError> {
        self.context.pipeline.get_json("/cgi-bin/tag/list").await
    }

    /// Get the members of tag `id`
    ///
    /// GET /cgi-bin/tag/get?tagid=ID
    pub async fn get_tag_users(&self, id: u32) -> Result<TagUsersResponse, WechatError> {
        let tagid = id.to_string();
        let path = with_query("/cgi-bin/tag/get", &[("tagid", tagid.as_str())]);
        self.context.pipeline.get_json(&path).await
    }

    /// Add `user_ids` to tag `id`
    ///
    /// POST /cgi-bin/tag/addtagusers
    pub async fn add_tag_users(
        &self,
        id: u32,
        user_ids: &[String],
    ) -> Result<TagUsersChangeResponse, WechatError> {
        let request = TagUsersRequest {
            tagid: id,
            userlist: user_ids,
        };
        self.context
            .pipeline
            .post_json("/cgi-bin/tag/addtagusers", &request)
            .await
    }

    /// Remove `user_ids` from tag `id`
    ///
    /// POST /cgi-bin/tag/deltagusers
    pub async fn delete_tag_users(
        &self,
        id: u32,
        user_ids: &[String],
    ) -> Result<TagUsersChangeResponse, WechatError> {
        let request = TagUsersRequest {
            tagid: id,
            userlist: user_ids,
        };
        self.context
            .pipeline
            .post_json("/cgi-bin/tag/deltagusers", &request)
            .await
    }
}

impl WechatApi for TagApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "tag"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tag_response_with_string_id() {
        let json = r#"{"errcode": 0, "errmsg": "created", "tagid": "1"}"#;
        let response: CreateTagResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.tagid, 1);
        assert_eq!(response.errmsg, "created");
    }

    #[test]
    fn test_tag_users_response_parsing() {
        let json = r#"{
            "errcode": 0,
            "errmsg": "ok",
            "tagname": "ops",
            "userlist": [{"userid": "zhangsan", "name": "Li Si"}],
            "partylist": [2]
        }"#;
        let response: TagUsersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.tagname.as_deref(), Some("ops"));
        assert_eq!(response.userlist[0].userid, "zhangsan");
        assert_eq!(response.partylist, vec![2]);
    }

    #[test]
    fn test_invalid_users_split() {
        let json = r#"{"errcode": 0, "errmsg": "invalid userlist failed", "invalidlist": "usr1|usr2|usr"}"#;
        let response: TagUsersChangeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.invalid_users(), vec!["usr1", "usr2", "usr"]);

        let json = r#"{"errcode": 0, "errmsg": "deleted"}"#;
        let response: TagUsersChangeResponse = serde_json::from_str(json).unwrap();
        assert!(response.invalid_users().is_empty());
    }

    #[test]
    fn test_tag_users_request_serialization() {
        let users = vec!["id1".to_string(), "id2".to_string()];
        let request = TagUsersRequest {
            tagid: 3,
            userlist: &users,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"tagid": 3, "userlist": ["id1", "id2"]})
        );
    }
}
