use thiserror::Error;

/// Coarse classification of a [`WechatError`].
///
/// Lets callers branch on the failure class without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or connection failure before a response was received
    Transport,
    /// Response status outside the 200..=204 success band
    HttpStatus,
    /// Vendor-reported logical error (`errcode != 0`) or a failed `gettoken` call
    Authority,
    /// Malformed body where JSON was expected
    Decode,
    /// Access token could not be obtained
    Token,
    /// Token store hook failed
    Store,
    /// Invalid client configuration
    Config,
}

/// WeChat Work SDK error types
#[derive(Debug, Error)]
pub enum WechatError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The token authority answered with a status outside the success band.
    #[error("token authority returned HTTP status {status} from {url}")]
    AuthorityStatus { status: u16, url: String },

    #[error("WeChat Work API error (code={code}): {message}")]
    Api { code: i32, message: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Access token error: {0}")]
    Token(String),

    #[error("Token store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for WechatError {
    fn from(err: serde_json::Error) -> Self {
        WechatError::Decode(err.to_string())
    }
}

impl WechatError {
    /// Returns `Ok(())` for `errcode == 0`, otherwise [`WechatError::Api`].
    pub fn check_api(errcode: i32, errmsg: &str) -> Result<(), WechatError> {
        if errcode == 0 {
            Ok(())
        } else {
            Err(WechatError::Api {
                code: errcode,
                message: errmsg.to_string(),
            })
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WechatError::Transport(_) => ErrorKind::Transport,
            WechatError::HttpStatus { .. } => ErrorKind::HttpStatus,
            WechatError::AuthorityStatus { .. } | WechatError::Api { .. } => ErrorKind::Authority,
            WechatError::Decode(_) => ErrorKind::Decode,
            WechatError::Token(_) => ErrorKind::Token,
            WechatError::Store(_) => ErrorKind::Store,
            WechatError::Config(_) => ErrorKind::Config,
        }
    }

    /// Vendor error code, when the vendor reported one.
    pub fn code(&self) -> Option<i32> {
        match self {
            WechatError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this is a vendor error whose code is in `codes`.
    pub fn is_api_code_in(&self, codes: &[i32]) -> bool {
        self.code().is_some_and(|code| codes.contains(&code))
    }
}
