//! Callback IP API
//!
//! Lists the vendor server addresses callbacks originate from, for
//! firewall allow-lists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{WechatApi, WechatContext};
use crate::error::WechatError;

/// Response from getcallbackip
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackIpResponse {
    #[serde(default)]
    pub ip_list: Vec<String>,
}

pub struct IpApi {
    context: Arc<WechatContext>,
}

impl IpApi {
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// GET /cgi-bin/getcallbackip
    pub async fn get_callback_ip(&self) -> Result<CallbackIpResponse, WechatError> {
        self.context.pipeline.get_json("/cgi-bin/getcallbackip").await
    }
}

impl WechatApi for IpApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "ip"
    }
}
