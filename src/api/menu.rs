//! Application Menu API
//!
//! Custom menus are configured per application (`agentid`).
//!
//! # Endpoints
//!
//! - [`MenuApi::create_menu`] - Create or replace an application menu
//! - [`MenuApi::get_menu`] - Get the current application menu
//! - [`MenuApi::remove_menu`] - Delete the application menu

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::common::ApiResponseBase;
use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::utils::with_query;

/// Top-level menu: at most 3 buttons, each with at most 5 sub-buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Menu {
    #[serde(default)]
    pub button: Vec<MenuButton>,
}

impl Menu {
    pub fn new(button: Vec<MenuButton>) -> Self {
        Self { button }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MenuButton {
    /// `click`, `view`, `scancode_push`, ... ; absent on parent buttons
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_button: Vec<MenuButton>,
}

impl MenuButton {
    /// Button that pushes a click event carrying `key`.
    pub fn click(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: Some("click".to_string()),
            name: name.into(),
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Button that opens `url`.
    pub fn view(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: Some("view".to_string()),
            name: name.into(),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Parent button grouping `sub_button`.
    pub fn parent(name: impl Into<String>, sub_button: Vec<MenuButton>) -> Self {
        Self {
            name: name.into(),
            sub_button,
            ..Self::default()
        }
    }
}

/// Response from menu/get
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetMenuResponse {
    #[serde(default)]
    pub menu: Menu,
}

/// Application Menu API
pub struct MenuApi {
    context: Arc<WechatContext>,
}

impl MenuApi {
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// Create (or replace) the menu of application `agentid`
    ///
    /// POST /cgi-bin/menu/create?agentid=AGENTID
    pub async fn create_menu(
        &self,
        agentid: i64,
        menu: &Menu,
    ) -> Result<ApiResponseBase, WechatError> {
        let agentid = agentid.to_string();
        let path = with_query("/cgi-bin/menu/create", &[("agentid", agentid.as_str())]);
        self.context.pipeline.post_json(&path, menu).await
    }

    /// Get the menu of application `agentid`
    ///
    /// GET /cgi-bin/menu/get?agentid=AGENTID
    pub async fn get_menu(&self, agentid: i64) -> Result<GetMenuResponse, WechatError> {
        let agentid = agentid.to_string();
        let path = with_query("/cgi-bin/menu/get", &[("agentid", agentid.as_str())]);
        self.context.pipeline.get_json(&path).await
    }

    /// Delete the menu of application `agentid`
    ///
    /// GET /cgi-bin/menu/delete?agentid=AGENTID
    pub async fn remove_menu(&self, agentid: i64) -> Result<ApiResponseBase, WechatError> {
        let agentid = agentid.to_string();
        let path = with_query("/cgi-bin/menu/delete", &[("agentid", agentid.as_str())]);
        self.context.pipeline.get_json(&path).await
    }
}

impl WechatApi for MenuApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "menu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_serialization_skips_empty_fields() {
        let menu = Menu::new(vec![
            MenuButton::click("Today", "V1001_TODAY_MUSIC"),
            MenuButton::parent(
                "Menu",
                vec![MenuButton::view("Search", "http://www.soso.com/")],
            ),
        ]);

        let value = serde_json::to_value(&menu).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "button": [
                    {"type": "click", "name": "Today", "key": "V1001_TODAY_MUSIC"},
                    {"name": "Menu", "sub_button": [
                        {"type": "view", "name": "Search", "url": "http://www.soso.com/"}
                    ]}
                ]
            })
        );
    }

    #[test]
    fn test_get_menu_response_parsing() {
        let json = r#"{
            "errcode": 0,
            "errmsg": "ok",
            "menu": {
                "button": [
                    {"type": "click", "name": "Today", "key": "V1001_TODAY_MUSIC", "sub_button": []},
                    {"name": "Menu", "sub_button": [
                        {"type": "view", "name": "Video", "url": "http://v.qq.com/", "sub_button": []}
                    ]}
                ]
            }
        }"#;

        let response: GetMenuResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.menu.button.len(), 2);
        assert_eq!(response.menu.button[0].kind.as_deref(), Some("click"));
        assert!(response.menu.button[1].kind.is_none());
        assert_eq!(
            response.menu.button[1].sub_button[0].url.as_deref(),
            Some("http://v.qq.com/")
        );
    }
}
