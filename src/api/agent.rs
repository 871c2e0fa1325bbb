//! Application (Agent) API
//!
//! # Endpoints
//!
//! - [`AgentApi::list_agents`] - List the applications visible to the secret
//! - [`AgentApi::get_agent`] - Get one application
//! - [`AgentApi::set_agent`] - Update application settings

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::common::ApiResponseBase;
use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::utils::with_query;

#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSummary {
    pub agentid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub square_logo_url: Option<String>,
}

/// Response from agent/list
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListAgentsResponse {
    #[serde(default)]
    pub agentlist: Vec<AgentSummary>,
}

/// Response from agent/get
///
/// Visibility lists (`allow_userinfos`, `allow_partys`, `allow_tags`) are kept
/// as raw JSON.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentDetail {
    pub agentid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub square_logo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub allow_userinfos: Option<serde_json::Value>,
    #[serde(default)]
    pub allow_partys: Option<serde_json::Value>,
    #[serde(default)]
    pub allow_tags: Option<serde_json::Value>,
    #[serde(default)]
    pub close: Option<u8>,
    #[serde(default)]
    pub redirect_domain: Option<String>,
    #[serde(default)]
    pub report_location_flag: Option<u8>,
    #[serde(default)]
    pub isreportenter: Option<u8>,
    #[serde(default)]
    pub home_url: Option<String>,
}

/// Body of agent/set. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentSettings {
    pub agentid: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_location_flag: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_mediaid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isreportenter: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
}

impl AgentSettings {
    pub fn new(agentid: i64) -> Self {
        Self {
            agentid,
            ..Self::default()
        }
    }
}

pub struct AgentApi {
    context: Arc<WechatContext>,
}

impl AgentApi {
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// GET /cgi-bin/agent/list
    pub async fn list_agents(&self) -> Result<ListAgentsResponse, WechatError> {
        self.context.pipeline.get_json("/cgi-bin/agent/list").await
    }

    /// GET /cgi-bin/agent/get?agentid=AGENTID
    pub async fn get_agent(&self, agentid: i64) -> Result<AgentDetail, WechatError> {
        let agentid = agentid.to_string();
        let path = with_query("/cgi-bin/agent/get", &[("agentid", agentid.as_str())]);
        self.context.pipeline.get_json(&path).await
    }

    /// POST /cgi-bin/agent/set
    pub async fn set_agent(&self, settings: &AgentSettings) -> Result<ApiResponseBase, WechatError> {
        self.context
            .pipeline
            .post_json("/cgi-bin/agent/set", settings)
            .await
    }
}

impl WechatApi for AgentApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "agent"
    }
}
