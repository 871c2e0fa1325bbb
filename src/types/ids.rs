use serde::{Deserialize, Serialize};

/// WeChat Work corporation ID (the `corpid`, usually starting with `ww` or `wx`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorpId(String);

impl CorpId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("CorpId must not be empty".to_string());
        }
        if id.chars().any(char::is_whitespace) {
            return Err(format!("CorpId must not contain whitespace, got {:?}", id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Secret of a WeChat Work management group or application (`corpsecret`)
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorpSecret(String);

impl CorpSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, String> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err("CorpSecret must not be empty".to_string());
        }
        Ok(Self(secret))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CorpSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CorpSecret([REDACTED])")
    }
}
