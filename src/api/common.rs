//! Common API response primitives
//!
//! Most WeChat Work APIs return JSON with `errcode` / `errmsg`. The request
//! pipeline already turns a non-zero `errcode` into
//! [`WechatError::Api`](crate::WechatError::Api), so responses that reach an
//! API method are successful; the fields stay available for inspection
//! (some endpoints put partial-failure hints into `errmsg`).
//!
//! ```rust
//! use wechat_work_sdk::api::common::ApiResponseBase;
//!
//! let json = r#"{"errcode": 0, "errmsg": "created"}"#;
//! let resp: ApiResponseBase = serde_json::from_str(json).unwrap();
//! assert_eq!(resp.errmsg, "created");
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Accept an id the vendor sometimes sends as a number and sometimes as a string.
pub(crate) fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Minimal API response carrying only `errcode` and `errmsg`.
///
/// Returned by endpoints that report nothing beyond success, e.g.
/// `{"errcode": 0, "errmsg": "deleted"}`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiResponseBase {
    /// Error code (`0` = success)
    #[serde(default)]
    pub errcode: i32,
    /// Error message
    #[serde(default)]
    pub errmsg: String,
}
