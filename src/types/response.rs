use serde::de::DeserializeOwned;

use crate::error::WechatError;

/// Body returned by the request pipeline once the vendor error check passed.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON payload
    Json(serde_json::Value),
    /// Body of a non-JSON response (media, files)
    Raw(Vec<u8>),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    /// Deserialize a JSON body into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, WechatError> {
        match self {
            ResponseBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| WechatError::Decode(e.to_string())),
            ResponseBody::Raw(bytes) => Err(WechatError::Decode(format!(
                "expected a JSON response, got {} raw bytes",
                bytes.len()
            ))),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResponseBody::Json(value) => value.to_string().into_bytes(),
            ResponseBody::Raw(bytes) => bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_json() {
        #[derive(serde::Deserialize)]
        struct IpList {
            ip_list: Vec<String>,
        }

        let body = ResponseBody::Json(serde_json::json!({"ip_list": ["10.0.0.1"]}));
        let parsed: IpList = body.into_json().unwrap();
        assert_eq!(parsed.ip_list, vec!["10.0.0.1".to_string()]);
    }

    #[test]
    fn test_raw_into_json_is_decode_error() {
        let body = ResponseBody::Raw(vec![0xff, 0xd8]);
        let result = body.into_json::<serde_json::Value>();
        assert!(matches!(result, Err(WechatError::Decode(_))));
    }

    #[test]
    fn test_into_bytes() {
        assert_eq!(ResponseBody::Raw(b"abc".to_vec()).into_bytes(), b"abc");
        assert!(ResponseBody::Raw(vec![]).as_json().is_none());
    }
}
