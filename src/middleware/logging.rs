use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use log::{debug, info, warn};
use reqwest::{Request, Response};
use tower::{Layer, Service};

use crate::utils::redact_url;

/// Logs method, redacted URL, status and latency of every HTTP exchange.
///
/// Credentials in the query string (`access_token`, `corpsecret`, `code`)
/// are masked before anything is written.
#[derive(Clone)]
pub struct LoggingMiddleware {
    verbose: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Log at `debug` level with request/response markers instead of `info`.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for LoggingMiddleware
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Service = LoggingMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddlewareService {
            inner,
            verbose: self.verbose,
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddlewareService<S> {
    inner: S,
    verbose: bool,
}

fn log_request(method: &str, url: &str, verbose: bool) {
    if verbose {
        debug!("[WechatWork] >>> {} {}", method, url);
    } else {
        info!("[WechatWork] {} {}", method, url);
    }
}

fn log_response(url: &str, status: reqwest::StatusCode, duration: std::time::Duration, verbose: bool) {
    let reason = status.canonical_reason().unwrap_or("");
    if verbose {
        debug!(
            "[WechatWork] <<< {} {} {} ({:?})",
            url,
            status.as_u16(),
            reason,
            duration
        );
    } else {
        info!("[WechatWork] {} {} ({:?})", url, status.as_u16(), duration);
    }
}

impl<S, Error> Service<Request> for LoggingMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = Error> + Send + Clone + 'static,
    S::Future: Send,
    Error: std::fmt::Display + Send + 'static,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().as_str().to_string();
        let url = redact_url(req.url().as_str());
        let verbose = self.verbose;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            log_request(&method, &url, verbose);

            let start = Instant::now();
            match inner.call(req).await {
                Ok(response) => {
                    log_response(&url, response.status(), start.elapsed(), verbose);
                    Ok(response)
                }
                Err(err) => {
                    warn!(
                        "[WechatWork] {} {} failed after {:?}: {}",
                        method,
                        url,
                        start.elapsed(),
                        err
                    );
                    Err(err)
                }
            }
        })
    }
}
