//! Retry middleware for transient transport failures.
//!
//! This middleware retries HTTP exchanges that are likely to succeed on a
//! subsequent attempt. It works below the request pipeline: vendor error
//! codes (including token expiry) are not visible here and are handled by
//! [`RequestPipeline`](crate::pipeline::RequestPipeline).
//!
//! # Retry Conditions
//!
//! - Connect and timeout errors
//! - HTTP 5xx responses
//!
//! # Non-Idempotent Requests
//!
//! By default, POST requests are NOT retried as they may cause duplicate
//! operations (creating a member twice, sending an invitation twice).
//! Use `with_retry_post(true)` to enable retrying POST requests.

use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use log::warn;
use reqwest::{Request, Response};
use tokio::time::sleep;
use tower::{Layer, Service};

use crate::utils::{jittered_delay, redact_url};

/// Middleware that retries requests on connect/timeout errors and 5xx.
#[derive(Clone, Debug)]
pub struct RetryMiddleware {
    max_retries: u32,
    delay_ms: u64,
    retry_post: bool,
}

impl RetryMiddleware {
    /// Create a new RetryMiddleware with default settings.
    ///
    /// Default: max_retries = 3, delay_ms = 100ms, retry_post = false
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 100,
            retry_post: false,
        }
    }

    /// Set the number of retries after the first attempt. `0` disables retry.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the base delay between retries in milliseconds.
    pub fn with_delay_ms(mut self, delay: u64) -> Self {
        self.delay_ms = delay;
        self
    }

    /// Enable retrying POST requests (disabled by default).
    pub fn with_retry_post(mut self, retry: bool) -> Self {
        self.retry_post = retry;
        self
    }

    /// Whether a transport error is worth another attempt.
    pub fn is_retryable_error(error: &reqwest::Error) -> bool {
        error.is_connect() || error.is_timeout()
    }
}

impl Default for RetryMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for RetryMiddleware {
    type Service = RetryMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryMiddlewareService {
            inner,
            max_retries: self.max_retries,
            delay_ms: self.delay_ms,
            retry_post: self.retry_post,
        }
    }
}

#[derive(Clone)]
pub struct RetryMiddlewareService<S> {
    inner: S,
    max_retries: u32,
    delay_ms: u64,
    retry_post: bool,
}

fn is_idempotent(request: &Request) -> bool {
    !matches!(
        request.method(),
        &reqwest::Method::POST | &reqwest::Method::PUT | &reqwest::Method::PATCH
    )
}

impl<S> Service<Request> for RetryMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = reqwest::Error> + Send + Clone + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = reqwest::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let max_retries = self.max_retries;
        let delay_ms = self.delay_ms;
        let retry_post = self.retry_post;

        Box::pin(async move {
            if max_retries == 0 || (!is_idempotent(&req) && !retry_post) {
                return inner.call(req).await;
            }

            let url = redact_url(req.url().as_str());
            let mut attempt = 0;
            let mut current = req;

            loop {
                // Streaming bodies cannot be replayed; such requests get one attempt.
                let Some(next) = current.try_clone() else {
                    return inner.call(current).await;
                };

                let exhausted = attempt >= max_retries;
                let outcome = inner.call(current).await;
                let retry = match &outcome {
                    Ok(response) => response.status().is_server_error(),
                    Err(err) => RetryMiddleware::is_retryable_error(err),
                };

                if !retry || exhausted {
                    return outcome;
                }

                match &outcome {
                    Ok(response) => warn!(
                        "[WechatWork] {} returned {}, retrying ({}/{})",
                        url,
                        response.status().as_u16(),
                        attempt + 1,
                        max_retries
                    ),
                    Err(err) => warn!(
                        "[WechatWork] {} failed: {}, retrying ({}/{})",
                        url,
                        err,
                        attempt + 1,
                        max_retries
                    ),
                }

                sleep(jittered_delay(delay_ms, attempt)).await;
                attempt += 1;
                current = next;
            }
        })
    }
}
