use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;

use crate::error::WechatError;

/// How the pipeline decodes a successful response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Decode as JSON when `content-type` contains `application/json`,
    /// otherwise return the raw bytes.
    #[default]
    Auto,
    /// Always decode as JSON, whatever the declared content type.
    Json,
    /// Never decode; return the body bytes verbatim.
    Raw,
}

/// Per-call request options.
///
/// Every field is optional so that call-specific options can be layered over
/// instance defaults with [`RequestOptions::merged`]. Headers merge key by key,
/// all other fields are replaced when set on the override.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    pub response_format: Option<ResponseFormat>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET with no body.
    pub fn get() -> Self {
        Self {
            method: Some(Method::GET),
            ..Self::default()
        }
    }

    /// POST with a JSON body.
    pub fn post_json<B: Serialize + ?Sized>(body: &B) -> Result<Self, WechatError> {
        Ok(Self {
            method: Some(Method::POST),
            body: Some(serde_json::to_value(body)?),
            ..Self::default()
        })
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Layer `overrides` on top of `self`, returning a new value.
    ///
    /// Headers from `overrides` are inserted into a copy of `self.headers`, so
    /// keys present only in the defaults survive.
    pub fn merged(&self, overrides: &RequestOptions) -> RequestOptions {
        let mut headers = self.headers.clone();
        for (name, value) in &overrides.headers {
            headers.insert(name.clone(), value.clone());
        }

        RequestOptions {
            method: overrides.method.clone().or_else(|| self.method.clone()),
            headers,
            body: overrides.body.clone().or_else(|| self.body.clone()),
            response_format: overrides.response_format.or(self.response_format),
            timeout: overrides.timeout.or(self.timeout),
        }
    }

    pub(crate) fn effective_method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    pub(crate) fn effective_format(&self) -> ResponseFormat {
        self.response_format.unwrap_or_default()
    }
}
